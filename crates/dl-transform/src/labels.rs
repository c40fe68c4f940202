use dl_core::LabelSet;
use dl_parser::{parse_document, resolve_label};
use tracing::trace;

/// Distinct labels of every edge statement; unlabelled edges contribute the
/// no-label sentinel.
#[must_use]
pub fn extract_labels(text: &str) -> LabelSet {
    parse_document(text)
        .edges()
        .map(|block| resolve_label(&block.text))
        .collect()
}

/// Memoizes [`extract_labels`] for the last document seen. Purely an
/// optimisation: results are identical with or without it.
#[derive(Debug, Clone, Default)]
pub struct LabelCache {
    last_text: Option<String>,
    labels: LabelSet,
    hits: u64,
    misses: u64,
}

impl LabelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&mut self, text: &str) -> &LabelSet {
        if self.last_text.as_deref() == Some(text) {
            self.hits += 1;
            trace!(hits = self.hits, "label cache hit");
        } else {
            self.misses += 1;
            self.labels = extract_labels(text);
            self.last_text = Some(text.to_string());
            trace!(misses = self.misses, labels = self.labels.len(), "label cache refreshed");
        }
        &self.labels
    }

    /// Whether `text` is the document the cache currently holds.
    #[must_use]
    pub fn is_current(&self, text: &str) -> bool {
        self.last_text.as_deref() == Some(text)
    }

    pub fn clear(&mut self) {
        self.last_text = None;
        self.labels = LabelSet::new();
    }

    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use dl_core::LabelKey;

    use super::*;

    #[test]
    fn collects_distinct_labels_and_sentinel() {
        let labels = extract_labels(
            "digraph {\n  a -> b [label=\"call\"];\n  b -> c [label=call];\n  c -> d;\n  d [label=\"node\"];\n}",
        );
        assert_eq!(labels.sorted(), vec![LabelKey::NoLabel, LabelKey::from("call")]);
    }

    #[test]
    fn multi_line_labels_are_found() {
        let labels = extract_labels("a -> b [\n  color=red,\n  label=<x>\n];");
        assert_eq!(labels.labels(), vec!["x"]);
        assert!(!labels.has_unlabeled());
    }

    #[test]
    fn documents_without_edges_have_no_labels() {
        assert!(extract_labels("digraph { a; b [label=x]; }").is_empty());
        assert!(extract_labels("").is_empty());
    }

    #[test]
    fn cache_recomputes_only_on_change() {
        let mut cache = LabelCache::new();
        let first = cache.labels("a -> b [label=x]").clone();
        let again = cache.labels("a -> b [label=x]").clone();
        assert_eq!(first, again);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        let changed = cache.labels("a -> b [label=y]").labels();
        assert_eq!(changed, vec!["y"]);
        assert_eq!(cache.misses(), 2);
        assert!(cache.is_current("a -> b [label=y]"));

        cache.clear();
        assert!(!cache.is_current("a -> b [label=y]"));
    }
}
