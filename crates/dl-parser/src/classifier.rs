use dl_core::{EdgeConnector, StatementKind, Value, is_reserved_keyword};

use crate::attributes::scan_attributes;
use crate::segment::split_statements;
use crate::tokenizer::tokenize_id;

/// Decides whether a line opens an edge statement, a node statement, or
/// neither.
///
/// Checks run in a fixed order:
/// 1. blank lines, comments (`//`, `#`, `/*`) and brace/bracket lines are Other;
/// 2. a leading reserved keyword (`graph`, `node`, ...) is Other;
/// 3. an endpoint followed by `->` or `--` is an Edge;
/// 4. a lone `key = value` assignment is Other;
/// 5. `id [`, a bare `id` line, or any other line holding `=` is a Node;
/// 6. everything else is Other.
#[must_use]
pub fn classify_line(line: &str) -> StatementKind {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_comment(trimmed) || trimmed.starts_with(['{', '}', '[', ']']) {
        return StatementKind::Other;
    }

    let Some((id, id_end)) = read_endpoint(trimmed, 0) else {
        return if trimmed.contains('=') && !is_pure_assignment(trimmed) {
            StatementKind::Node
        } else {
            StatementKind::Other
        };
    };
    if matches!(&id, Value::Bare(word) if is_reserved_keyword(word)) {
        return StatementKind::Other;
    }

    let rest = trimmed[id_end..].trim_start();
    if connector_at(rest).is_some() {
        return StatementKind::Edge;
    }
    if is_pure_assignment(trimmed) {
        return StatementKind::Other;
    }
    if rest.starts_with('[') || rest.trim_end_matches(';').trim().is_empty() || trimmed.contains('=') {
        return StatementKind::Node;
    }
    StatementKind::Other
}

/// Reads an endpoint id at `from`, including any `:port[:compass]` suffix,
/// and returns the id with the byte offset just past the endpoint.
pub(crate) fn read_endpoint(text: &str, from: usize) -> Option<(Value, usize)> {
    let (id, consumed) = tokenize_id(&text[from..])?;
    let mut end = from + consumed;
    for _ in 0..2 {
        let Some(after_colon) = text[end..].strip_prefix(':') else {
            break;
        };
        match tokenize_id(after_colon) {
            Some((_, port_len)) => end += 1 + port_len,
            None => break,
        }
    }
    Some((id, end))
}

pub(crate) fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with("/*")
}

pub(crate) fn connector_at(text: &str) -> Option<EdgeConnector> {
    text.get(..2).and_then(EdgeConnector::parse)
}

// `rankdir=LR;` and friends: every statement piece is exactly one pair.
fn is_pure_assignment(trimmed: &str) -> bool {
    let pieces = split_statements(trimmed);
    !pieces.is_empty()
        && pieces.into_iter().all(|range| {
            let piece = &trimmed[range];
            matches!(
                scan_attributes(piece).as_slice(),
                [only] if only.range == (0..piece.len())
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_need_a_connector_before_any_bracket() {
        assert_eq!(classify_line("a -> b"), StatementKind::Edge);
        assert_eq!(classify_line("  a--b;"), StatementKind::Edge);
        assert_eq!(classify_line("\"x y\" -> z [label=\"k\"]"), StatementKind::Edge);
        assert_eq!(classify_line("a:out:n -> b:in"), StatementKind::Edge);
        assert_eq!(classify_line("a -> b -> c ["), StatementKind::Edge);
        assert_eq!(classify_line("a [label=\"x -> y\"]"), StatementKind::Node);
    }

    #[test]
    fn nodes_cover_bracketed_bare_and_assignment_lines() {
        assert_eq!(classify_line("a [shape=box]"), StatementKind::Node);
        assert_eq!(classify_line("a ["), StatementKind::Node);
        assert_eq!(classify_line("alpha;"), StatementKind::Node);
        assert_eq!(classify_line("node-1"), StatementKind::Node);
        assert_eq!(classify_line("shape=box, color=red"), StatementKind::Node);
    }

    #[test]
    fn directives_comments_and_braces_are_other() {
        for line in [
            "",
            "   ",
            "// a -> b",
            "# a -> b",
            "/* a -> b */",
            "digraph G {",
            "strict graph {",
            "subgraph cluster_0 {",
            "node [shape=box];",
            "EDGE [color=gray]",
            "}",
            "];",
            "rankdir=LR;",
            "label = \"Title\"",
            "a b c",
        ] {
            assert_eq!(classify_line(line), StatementKind::Other, "line: {line:?}");
        }
    }

    #[test]
    fn keyword_prefixed_ids_are_not_keywords() {
        assert_eq!(classify_line("nodeA -> b"), StatementKind::Edge);
        assert_eq!(classify_line("edge_1 [label=x]"), StatementKind::Node);
        assert_eq!(classify_line("\"node\" [label=x]"), StatementKind::Node);
    }

    #[test]
    fn endpoints_skip_ports() {
        assert_eq!(read_endpoint("a:p:n -> b", 0).map(|(id, end)| (id.into_string(), end)), Some(("a".to_string(), 5)));
        assert_eq!(read_endpoint("-> b", 0).map(|(_, end)| end), None);
    }
}
