use std::collections::BTreeMap;

use dl_core::{StatementBlock, StatementKind};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::attributes::find_attribute_lists;
use crate::classifier::classify_line;
use crate::identity::{edge_identities, node_id};
use crate::segment::split_statements;

/// Definition text keyed by node id and by every edge lookup key.
///
/// Fallback edge keys (`a->b`, `a b`, `a--b`) follow first-registered-wins.
/// A triplet key outranks them: it takes over a key that so far was only
/// claimed as a fallback, but never one claimed as another edge's triplet.
/// Nodes follow last-definition-wins, except that a bare `a;` never
/// replaces a definition that carries attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefinitionRegistry {
    nodes: BTreeMap<String, String>,
    edges: BTreeMap<String, String>,
    #[serde(skip)]
    triplet_keys: FxHashSet<String>,
}

impl DefinitionRegistry {
    #[must_use]
    pub fn build(text: &str) -> Self {
        Self::from_blocks(&crate::parse_document(text).blocks)
    }

    #[must_use]
    pub fn from_blocks(blocks: &[StatementBlock]) -> Self {
        let mut registry = Self::default();

        for block in blocks.iter().filter(|block| block.kind != StatementKind::Other) {
            for range in split_statements(&block.text) {
                let statement = &block.text[range];
                match classify_line(statement) {
                    StatementKind::Edge => registry.register_edge(statement),
                    StatementKind::Node => registry.register_node(statement),
                    StatementKind::Other => {}
                }
            }
        }

        registry
    }

    fn register_node(&mut self, statement: &str) {
        let Some(id) = node_id(statement) else {
            return;
        };
        let bare = find_attribute_lists(statement).is_empty();
        if bare {
            if let Some(existing) = self.nodes.get(&id) {
                if !find_attribute_lists(existing).is_empty() {
                    return;
                }
            }
        }
        self.nodes.insert(id, definition_text(statement));
    }

    fn register_edge(&mut self, statement: &str) {
        let identities = edge_identities(statement);
        if identities.is_empty() {
            return;
        }
        let definition = definition_text(statement);
        for identity in &identities {
            let triplet = identity.triplet_key();
            for key in identity.lookup_keys() {
                if triplet.as_ref() == Some(&key) {
                    if self.triplet_keys.insert(key.clone()) {
                        self.edges.insert(key, definition.clone());
                    }
                } else {
                    self.edges.entry(key).or_insert_with(|| definition.clone());
                }
            }
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<String, String> {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &BTreeMap<String, String> {
        &self.edges
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn edge(&self, key: &str) -> Option<&str> {
        self.edges.get(key).map(String::as_str)
    }

    /// Looks up a node by a renderer-provided title.
    #[must_use]
    pub fn find_node(&self, title: &str) -> Option<&str> {
        let trimmed = title.trim();
        self.node(trimmed)
            .or_else(|| self.node(trimmed.trim_matches('"')))
    }

    /// Looks up an edge by a renderer-provided title such as `a->b` or
    /// `a&#45;&gt;b`. Exact keys win; otherwise keys are compared with
    /// whitespace removed and `--` read as `->`.
    #[must_use]
    pub fn find_edge(&self, title: &str) -> Option<&str> {
        let decoded = decode_entities(title.trim());
        if let Some(definition) = self.edge(&decoded) {
            return Some(definition);
        }
        let wanted = normalize_edge_key(&decoded);
        self.edges
            .iter()
            .find(|(key, _)| normalize_edge_key(key) == wanted)
            .map(|(_, definition)| definition.as_str())
    }
}

/// Lines trimmed, joined with `\n`, without the terminating `;`.
fn definition_text(statement: &str) -> String {
    let joined = statement
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    joined
        .trim_end_matches(|ch: char| ch == ';' || ch.is_whitespace())
        .to_string()
}

fn normalize_edge_key(key: &str) -> String {
    key.chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .replace("--", "->")
}

fn decode_entities(title: &str) -> String {
    title
        .replace("&#45;", "-")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}
