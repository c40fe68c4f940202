use dl_core::{EdgeSelection, StatementKind};
use dl_parser::resolve_label;
use serde::Serialize;
use tracing::debug;

use crate::rewrite::{Edit, rewrite};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub text: String,
    pub edges_kept: usize,
    pub edges_removed: usize,
}

/// Keeps only the edge statements whose label (or the no-label sentinel)
/// is selected. Node statements and every other line pass through verbatim.
/// [`EdgeSelection::All`] returns the input unchanged.
#[must_use]
pub fn filter_by_labels(text: &str, selection: &EdgeSelection) -> String {
    filter_with_counts(text, selection).text
}

#[must_use]
pub fn filter_with_counts(text: &str, selection: &EdgeSelection) -> FilterOutcome {
    if selection.is_all() {
        let edges = dl_parser::parse_document(text).edges().count();
        return FilterOutcome {
            text: text.to_string(),
            edges_kept: edges,
            edges_removed: 0,
        };
    }

    let mut edges_kept = 0;
    let mut edges_removed = 0;
    let filtered = rewrite(text, |block| {
        if block.kind != StatementKind::Edge {
            return Edit::Keep;
        }
        if selection.admits(&resolve_label(&block.text)) {
            edges_kept += 1;
            Edit::Keep
        } else {
            edges_removed += 1;
            Edit::Drop
        }
    });

    debug!(edges_kept, edges_removed, "filtered edges by label");
    FilterOutcome {
        text: filtered,
        edges_kept,
        edges_removed,
    }
}

#[cfg(test)]
mod tests {
    use dl_core::{ALL_SENTINEL, NO_LABEL_SENTINEL};

    use super::*;

    const GRAPH: &str = "digraph G {\n  a [shape=box];\n  a -> b [label=\"call\"];\n  a -> c;\n  b -> c [\n    label=\"read\"\n  ];\n  rankdir=LR;\n}";

    #[test]
    fn keeps_selected_edges_and_all_non_edges() {
        let out = filter_by_labels(GRAPH, &EdgeSelection::from_values(["call"]));
        assert_eq!(
            out,
            "digraph G {\n  a [shape=box];\n  a -> b [label=\"call\"];\n  rankdir=LR;\n}"
        );
    }

    #[test]
    fn sentinel_selects_unlabelled_edges() {
        let outcome = filter_with_counts(GRAPH, &EdgeSelection::from_values([NO_LABEL_SENTINEL]));
        assert!(outcome.text.contains("  a -> c;"));
        assert!(!outcome.text.contains("call"));
        assert!(!outcome.text.contains("read"));
        assert_eq!((outcome.edges_kept, outcome.edges_removed), (1, 2));
    }

    #[test]
    fn empty_or_all_selection_is_fail_open() {
        assert_eq!(filter_by_labels(GRAPH, &EdgeSelection::from_values(Vec::<&str>::new())), GRAPH);
        assert_eq!(filter_by_labels(GRAPH, &EdgeSelection::from_values(["read", ALL_SENTINEL])), GRAPH);
    }

    #[test]
    fn selecting_nothing_present_leaves_only_non_edges() {
        let out = filter_by_labels(GRAPH, &EdgeSelection::from_values(["missing"]));
        assert_eq!(out, "digraph G {\n  a [shape=box];\n  rankdir=LR;\n}");
    }

    #[test]
    fn compact_scenario_keeps_the_call_edge_only() {
        let out = filter_by_labels(
            "digraph { a -> b [label=\"call\"]; a -> c; }",
            &EdgeSelection::from_values(["call"]),
        );
        assert_eq!(out, "digraph { a -> b [label=\"call\"]; }");
    }

    #[test]
    fn compact_line_of_dropped_edges_disappears() {
        let outcome = filter_with_counts(
            "digraph {\n  a -> b; a -> c;\n  d;\n}",
            &EdgeSelection::from_values(["x"]),
        );
        assert_eq!(outcome.text, "digraph {\n  d;\n}");
        assert_eq!((outcome.edges_kept, outcome.edges_removed), (0, 2));
    }

    #[test]
    fn edge_labels_compare_exactly() {
        let out = filter_by_labels(
            "a -> b [label=Call];\na -> c [label=\"call\"];",
            &EdgeSelection::from_values(["call"]),
        );
        assert_eq!(out, "a -> c [label=\"call\"];");
    }
}
