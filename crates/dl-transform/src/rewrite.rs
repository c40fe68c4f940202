use std::ops::Range;

use dl_core::StatementBlock;
use dl_parser::{Document, parse_document};

/// What to do with one statement block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Edit {
    Keep,
    Drop,
    Replace(String),
}

/// Rebuilds `text` from its blocks, applying one [`Edit`] per block.
///
/// Whole-line blocks are kept, dropped or replaced as units. Inline blocks
/// are edited within their line; dropping one also removes its trailing `;`
/// and the spaces after it, and a line left blank by drops is removed. Lines join with `\n`, so an all-`Keep` pass
/// reproduces the input exactly.
pub(crate) fn rewrite<F>(text: &str, mut decide: F) -> String
where
    F: FnMut(&StatementBlock) -> Edit,
{
    let document = Document::new(text);
    let parsed = parse_document(text);
    let mut out: Vec<String> = Vec::with_capacity(document.line_count());
    let mut blocks = parsed.blocks.iter().peekable();

    while let Some(block) = blocks.next() {
        if !block.inline {
            match decide(block) {
                Edit::Keep => out.push(block.text.clone()),
                Edit::Drop => {}
                Edit::Replace(replacement) => out.push(replacement),
            }
            continue;
        }

        let line = block.start_line();
        let mut pieces = vec![(block.span.start.col..block.span.end.col, decide(block))];
        while let Some(next) = blocks.next_if(|next| next.inline && next.start_line() == line) {
            pieces.push((next.span.start.col..next.span.end.col, decide(next)));
        }
        let dropped = pieces.iter().any(|(_, edit)| *edit == Edit::Drop);
        let edited = edit_line(document.line(line).unwrap_or_default(), pieces);
        if dropped && edited.trim().is_empty() {
            continue;
        }
        out.push(edited);
    }

    out.join("\n")
}

fn edit_line(line: &str, pieces: Vec<(Range<usize>, Edit)>) -> String {
    let mut text = line.to_string();
    for (range, edit) in pieces.into_iter().rev() {
        match edit {
            Edit::Keep => {}
            Edit::Replace(replacement) => text.replace_range(range, &replacement),
            Edit::Drop => {
                let end = drop_end(&text, range.end);
                text.replace_range(range.start..end, "");
            }
        }
    }
    text
}

/// End of a dropped piece: its trailing `;` and any spaces after it.
fn drop_end(text: &str, piece_end: usize) -> usize {
    let rest = &text[piece_end..];
    let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
    let Some(after_semicolon) = rest[spaces..].strip_prefix(';') else {
        return piece_end;
    };
    let trailing = after_semicolon.len() - after_semicolon.trim_start_matches([' ', '\t']).len();
    text.len() - after_semicolon.len() + trailing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeping_everything_reproduces_the_input() {
        let text = "digraph {\n  a -> b [\n    label=x\n  ];\n  c; d -> e;\n}\n";
        assert_eq!(rewrite(text, |_| Edit::Keep), text);
    }

    #[test]
    fn dropping_an_inline_piece_takes_its_terminator() {
        let text = "digraph { a -> b; a -> c; }";
        let out = rewrite(text, |block| {
            if block.text == "a -> b" {
                Edit::Drop
            } else {
                Edit::Keep
            }
        });
        assert_eq!(out, "digraph { a -> c; }");
    }

    #[test]
    fn replacing_inline_pieces_keeps_their_neighbours() {
        let text = "{ a -> b; a -> c }";
        let out = rewrite(text, |block| {
            if block.is_edge() {
                Edit::Replace(format!("{} [k=v]", block.text))
            } else {
                Edit::Keep
            }
        });
        assert_eq!(out, "{ a -> b [k=v]; a -> c [k=v] }");
    }

    #[test]
    fn dropping_every_inline_piece_removes_the_line() {
        let text = "digraph {\n  a -> b; a -> c;\n  d;\n}";
        let out = rewrite(text, |block| {
            if block.is_edge() { Edit::Drop } else { Edit::Keep }
        });
        assert_eq!(out, "digraph {\n  d;\n}");
    }

    #[test]
    fn dropping_whole_line_blocks_removes_their_lines() {
        let text = "a -> b [\nlabel=x\n];\nc";
        let out = rewrite(text, |block| {
            if block.is_edge() { Edit::Drop } else { Edit::Keep }
        });
        assert_eq!(out, "c");
    }

    #[test]
    fn drop_end_stops_without_a_semicolon() {
        assert_eq!(drop_end("a -> b  }", 6), 6);
        assert_eq!(drop_end("a -> b ;  c", 6), 10);
    }
}
