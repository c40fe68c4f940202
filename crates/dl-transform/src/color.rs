use dl_core::{ColorMap, LabelKey, LabelSet, PalettePreset, StatementKind};
use dl_parser::{edge_chain_end, find_attribute_lists, locate_attribute, resolve_label};
use tracing::{debug, trace};

use crate::palette::color_at;
use crate::rewrite::{Edit, rewrite};

/// Maps the `i`-th label of `labels` to `palette[i % len]`. Callers pass
/// labels sorted (see [`LabelSet::sorted`]) so the result is stable.
#[must_use]
pub fn assign_colors(labels: &[LabelKey], preset: PalettePreset) -> ColorMap {
    let mut colors = ColorMap::new();
    for (index, label) in labels.iter().enumerate() {
        colors.insert(label.clone(), color_at(preset, index));
    }
    colors
}

#[must_use]
pub fn color_map_for(labels: &LabelSet, preset: PalettePreset) -> ColorMap {
    assign_colors(&labels.sorted(), preset)
}

/// Sets `color` on every edge statement whose label has an entry in
/// `colors`. Other statements, and edges that cannot be rewritten, are left
/// byte-for-byte unchanged.
#[must_use]
pub fn apply_colors(text: &str, colors: &ColorMap) -> String {
    let mut recolored = 0usize;
    let out = rewrite(text, |block| {
        if block.kind != StatementKind::Edge {
            return Edit::Keep;
        }
        let label = resolve_label(&block.text);
        let Some(color) = colors.get(&label) else {
            trace!(label = %label, "no colour assigned");
            return Edit::Keep;
        };
        match color_statement(&block.text, color) {
            Some(updated) => {
                recolored += 1;
                Edit::Replace(updated)
            }
            None => Edit::Keep,
        }
    });
    debug!(recolored, palette_entries = colors.len(), "applied edge colours");
    out
}

/// Rewrites one edge statement to carry `color="<color>"`.
///
/// 1. An existing `color` attribute is replaced where it stands.
/// 2. Otherwise the pair goes right before the first list's `]`, after a
///    `, ` (or a single space when the list already ends in `,` or `;`).
/// 3. Without any list, ` [color="..."]` is inserted right after the last
///    endpoint, ahead of any terminator.
///
/// Returns `None` when nothing can be rewritten: an unclosed list, or no
/// `source connector target` to anchor a new list to.
#[must_use]
pub fn color_statement(statement: &str, color: &str) -> Option<String> {
    let pair = format!("color=\"{color}\"");

    if let Some(range) = locate_attribute(statement, "color") {
        let mut updated = statement.to_string();
        updated.replace_range(range, &pair);
        return Some(updated);
    }

    if let Some(list) = find_attribute_lists(statement).first() {
        let close = list.close?;
        let body = &statement[list.open + 1..close];
        let content = body.trim_end();
        let at = list.open + 1 + content.len();
        let separator = if content.is_empty() {
            ""
        } else if content.ends_with([',', ';']) {
            " "
        } else {
            ", "
        };
        let mut updated = statement.to_string();
        updated.insert_str(at, &format!("{separator}{pair}"));
        return Some(updated);
    }

    let end = edge_chain_end(statement)?;
    let mut updated = statement.to_string();
    updated.insert_str(end, &format!(" [{pair}]"));
    Some(updated)
}

#[cfg(test)]
mod tests {
    use dl_parser::extract_attributes;

    use super::*;
    use crate::labels::extract_labels;
    use crate::palette::DEFAULT_PALETTE;

    fn keys(values: &[&str]) -> Vec<LabelKey> {
        values.iter().copied().map(LabelKey::from).collect()
    }

    #[test]
    fn assignment_follows_sorted_order_and_cycles() {
        let labels: Vec<String> = (0..42).map(|i| format!("l{i:02}")).collect();
        let keys: Vec<LabelKey> = labels.iter().map(|label| LabelKey::from(label.as_str())).collect();
        let colors = assign_colors(&keys, PalettePreset::Default);
        assert_eq!(colors.len(), 42);
        assert_eq!(colors.get(&LabelKey::from("l00")), Some(DEFAULT_PALETTE[0]));
        assert_eq!(colors.get(&LabelKey::from("l39")), Some(DEFAULT_PALETTE[39]));
        assert_eq!(colors.get(&LabelKey::from("l40")), Some(DEFAULT_PALETTE[0]));
        assert_eq!(colors.get(&LabelKey::from("l41")), Some(DEFAULT_PALETTE[1]));
    }

    #[test]
    fn color_map_for_sorts_the_label_set() {
        let set: LabelSet = keys(&["zeta", "alpha", "__no_label__"]).into_iter().collect();
        let colors = color_map_for(&set, PalettePreset::Muted);
        let legend = colors.legend();
        assert_eq!(legend[0].display, "No label");
        assert_eq!(legend[1].display, "alpha");
        assert_eq!(colors.get(&LabelKey::from("alpha")), Some("#332288"));
    }

    #[test]
    fn replaces_existing_color_in_place() {
        assert_eq!(
            color_statement("a -> b [color=red, label=x];", "#111111").as_deref(),
            Some("a -> b [color=\"#111111\", label=x];")
        );
        assert_eq!(
            color_statement("a -> b [label=x Color = \"red\" penwidth=2]", "#111111").as_deref(),
            Some("a -> b [label=x color=\"#111111\" penwidth=2]")
        );
    }

    #[test]
    fn inserts_before_the_closing_bracket() {
        assert_eq!(
            color_statement("a -> b [label=x];", "#1").as_deref(),
            Some("a -> b [label=x, color=\"#1\"];")
        );
        assert_eq!(
            color_statement("a -> b [label=x, ]", "#1").as_deref(),
            Some("a -> b [label=x, color=\"#1\" ]")
        );
        assert_eq!(color_statement("a -> b []", "#1").as_deref(), Some("a -> b [color=\"#1\"]"));
        assert_eq!(
            color_statement("a -> b [\n  label=x\n];", "#1").as_deref(),
            Some("a -> b [\n  label=x, color=\"#1\"\n];")
        );
    }

    #[test]
    fn fillcolor_is_not_color() {
        assert_eq!(
            color_statement("a -> b [fillcolor=red]", "#1").as_deref(),
            Some("a -> b [fillcolor=red, color=\"#1\"]")
        );
    }

    #[test]
    fn synthesizes_a_list_when_none_exists() {
        assert_eq!(
            color_statement("  a -> b;", "#1").as_deref(),
            Some("  a -> b [color=\"#1\"];")
        );
        assert_eq!(
            color_statement("a -- b // note", "#1").as_deref(),
            Some("a -- b [color=\"#1\"] // note")
        );
        assert_eq!(color_statement("a:p -> b:q", "#1").as_deref(), Some("a:p -> b:q [color=\"#1\"]"));
    }

    #[test]
    fn unrewritable_statements_are_left_alone() {
        assert_eq!(color_statement("a [shape=box", "#1"), None);
        assert_eq!(color_statement("-> b", "#1"), None);
        assert_eq!(apply_colors("a -> b [label=x", &ColorMap::new()), "a -> b [label=x");
    }

    #[test]
    fn multi_line_edge_gets_its_color_replaced_not_duplicated() {
        let text = "digraph {\n  a -> b [\n    label=\"x\",\n    color=\"red\"\n  ];\n}";
        let colors = color_map_for(&extract_labels(text), PalettePreset::Default);
        let out = apply_colors(text, &colors);
        assert_eq!(
            out,
            "digraph {\n  a -> b [\n    label=\"x\",\n    color=\"#FF6B6B\"\n  ];\n}"
        );
        assert_eq!(out.matches("color=").count(), 1);
    }

    #[test]
    fn colours_unlabelled_edges_through_the_sentinel() {
        let text = "digraph { a -> b; b -> c [label=k]; c [label=n]; }";
        let colors = color_map_for(&extract_labels(text), PalettePreset::Default);
        let out = apply_colors(text, &colors);
        assert_eq!(
            out,
            "digraph { a -> b [color=\"#FF6B6B\"]; b -> c [label=k, color=\"#4ECDC4\"]; c [label=n]; }"
        );
    }

    #[test]
    fn other_attributes_keep_their_order() {
        let out = color_statement("a -> b [penwidth=2, label=x, style=dashed]", "#1")
            .expect("rewritable");
        let list = &out[out.find('[').map_or(0, |idx| idx + 1)..out.len() - 1];
        let order: Vec<String> = extract_attributes(list).into_iter().map(|a| a.key).collect();
        assert_eq!(order, vec!["penwidth", "label", "style", "color"]);
    }
}
