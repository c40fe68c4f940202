#![forbid(unsafe_code)]

mod attributes;
mod classifier;
mod collector;
mod document;
mod identity;
mod registry;
mod segment;
mod tokenizer;

use dl_core::{DotlensConfig, DotlensError, StatementBlock, StatementKind};
use serde::Serialize;
use serde_json::json;

pub use attributes::{
    AttributeList, ScannedAttribute, extract_attributes, find_attribute_lists, label_of,
    locate_attribute, scan_attributes, statement_attributes, statement_label,
};
pub use classifier::classify_line;
pub use collector::{Collected, collect_block, collect_blocks};
pub use document::Document;
pub use identity::{edge_chain_end, edge_identities, node_id, resolve_label};
pub use registry::DefinitionRegistry;
pub use segment::{has_top_level_brace, split_statements};
pub use tokenizer::{tokenize_id, tokenize_value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub blocks: Vec<StatementBlock>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub node_blocks: usize,
    pub edge_blocks: usize,
    pub other_blocks: usize,
    pub inline_blocks: usize,
    pub multi_line_blocks: usize,
}

impl ParsedDocument {
    #[must_use]
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        for block in &self.blocks {
            match block.kind {
                StatementKind::Node => stats.node_blocks += 1,
                StatementKind::Edge => stats.edge_blocks += 1,
                StatementKind::Other => stats.other_blocks += 1,
            }
            if block.inline {
                stats.inline_blocks += 1;
            } else if block.line_count() > 1 {
                stats.multi_line_blocks += 1;
            }
        }
        stats
    }

    pub fn edges(&self) -> impl Iterator<Item = &StatementBlock> {
        self.blocks.iter().filter(|block| block.is_edge())
    }
}

/// Splits `text` into statement blocks. Never fails; anomalies end up in
/// `warnings`.
#[must_use]
pub fn parse_document(text: &str) -> ParsedDocument {
    let document = Document::new(text);
    let (blocks, mut warnings) = collect_blocks(&document);

    if !text.trim().is_empty()
        && !blocks
            .iter()
            .any(|block| block.kind != StatementKind::Other)
    {
        warnings.push("document contained no node or edge statements".to_string());
    }

    ParsedDocument { blocks, warnings }
}

/// A `graph`/`digraph` header (optionally `strict`) on the first meaningful
/// line, plus braces somewhere in the text.
#[must_use]
pub fn looks_like_dot(input: &str) -> bool {
    let Some(first_line) = input
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("//") && !line.starts_with('#'))
    else {
        return false;
    };

    let lower = first_line.to_ascii_lowercase();
    let header = lower.strip_prefix("strict").map_or(lower.as_str(), str::trim_start);
    let keyword_len = if header.starts_with("digraph") {
        "digraph".len()
    } else if header.starts_with("graph") {
        "graph".len()
    } else {
        return false;
    };
    let after = &header[keyword_len..];
    if !(after.is_empty() || after.starts_with(|ch: char| ch.is_whitespace() || ch == '{')) {
        return false;
    }
    input.contains('{') && input.contains('}')
}

/// What the file-loading collaborator learns about a candidate input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub bytes: usize,
    pub lines: usize,
    pub looks_like_dot: bool,
    pub warnings: Vec<String>,
}

/// Checks a candidate input before it reaches the engine.
///
/// # Errors
///
/// Returns [`DotlensError::UnsupportedExtension`] when `name` lacks one of the
/// configured extensions, [`DotlensError::EmptyInput`] for blank text and
/// [`DotlensError::InputTooLarge`] above `config.max_input_bytes`.
pub fn validate_source(
    name: Option<&str>,
    text: &str,
    config: &DotlensConfig,
) -> Result<SourceReport, DotlensError> {
    if let Some(name) = name {
        if !config.accepts_file_name(name) {
            return Err(DotlensError::UnsupportedExtension {
                name: name.to_string(),
                expected: config.extension_list(),
            });
        }
    }
    if text.trim().is_empty() {
        return Err(DotlensError::EmptyInput);
    }
    if text.len() > config.max_input_bytes {
        return Err(DotlensError::InputTooLarge {
            size: text.len(),
            limit: config.max_input_bytes,
        });
    }

    let looks_like_dot = looks_like_dot(text);
    let mut warnings = Vec::new();
    if !looks_like_dot {
        warnings.push(
            "input does not look like DOT: expected a graph or digraph header with braces"
                .to_string(),
        );
    }

    Ok(SourceReport {
        bytes: text.len(),
        lines: text.lines().count(),
        looks_like_dot,
        warnings,
    })
}

#[must_use]
pub fn parse_summary_json(parsed: &ParsedDocument) -> String {
    let stats = parsed.stats();
    json!({
        "block_count": parsed.blocks.len(),
        "node_blocks": stats.node_blocks,
        "edge_blocks": stats.edge_blocks,
        "other_blocks": stats.other_blocks,
        "inline_blocks": stats.inline_blocks,
        "multi_line_blocks": stats.multi_line_blocks,
        "warning_count": parsed.warnings.len(),
        "warnings": parsed.warnings.clone(),
    })
    .to_string()
}
