use dl_core::{Span, StatementBlock, StatementKind};

use crate::classifier::{classify_line, is_comment};
use crate::document::Document;
use crate::segment::{has_top_level_brace, split_statements};

/// A collected block plus the warning raised when it ran off the end of the
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    pub block: StatementBlock,
    pub warning: Option<String>,
}

/// Collects the statement starting at line `start`.
///
/// Brackets are counted across every appended line, including ones inside
/// quoted values; a label holding a literal `]` ends the block early. The
/// block closes on the first line where either
/// - a `[` has been seen and the `]` count has caught up, or
/// - no `[` has been seen and the line ends with `;` or has no `=`.
///
/// If neither happens the block extends to the last line.
#[must_use]
pub fn collect_block(document: &Document<'_>, start: usize) -> Collected {
    let lines = document.lines();
    let start = start.min(lines.len().saturating_sub(1));
    let kind = lines.get(start).map_or(StatementKind::Other, |line| classify_line(line));

    let mut opened = 0usize;
    let mut closed = 0usize;
    let mut end = None;
    for (index, line) in lines.iter().enumerate().skip(start) {
        opened += line.matches('[').count();
        closed += line.matches(']').count();
        let trimmed = line.trim();
        let closes = if opened > 0 {
            closed >= opened
        } else {
            trimmed.ends_with(';') || !trimmed.contains('=')
        };
        if closes {
            end = Some(index);
            break;
        }
    }

    let line_number = start + 1;
    let (end, warning) = match end {
        Some(end) => (end, None),
        None if opened > 0 => (
            lines.len() - 1,
            Some(format!(
                "Line {line_number}: unbalanced '[', statement extends to end of input"
            )),
        ),
        None => (
            lines.len() - 1,
            Some(format!(
                "Line {line_number}: unterminated statement extends to end of input"
            )),
        ),
    };

    Collected {
        block: StatementBlock {
            kind,
            span: Span::new(document.position(start, 0), document.line_end(end)),
            text: document.join_lines(start, end),
            inline: false,
        },
        warning,
    }
}

/// Splits a whole document into blocks, in source order.
///
/// Node and Edge lines go through [`collect_block`]; every other line becomes
/// a single-line Other block. A balanced line holding several statements
/// (`digraph G { a -> b; b -> c; }`) is cut into inline blocks instead.
#[must_use]
pub fn collect_blocks(document: &Document<'_>) -> (Vec<StatementBlock>, Vec<String>) {
    let mut blocks = Vec::new();
    let mut warnings = Vec::new();
    let mut index = 0;

    while index < document.line_count() {
        if let Some(inline) = inline_blocks(document, index) {
            blocks.extend(inline);
            index += 1;
            continue;
        }

        let line = document.lines()[index];
        let kind = classify_line(line);
        if kind == StatementKind::Other {
            blocks.push(StatementBlock {
                kind,
                span: Span::new(document.position(index, 0), document.line_end(index)),
                text: line.to_string(),
                inline: false,
            });
            index += 1;
            continue;
        }

        let collected = collect_block(document, index);
        if let Some(warning) = collected.warning {
            warnings.push(warning);
        }
        index = collected.block.end_line() + 1;
        blocks.push(collected.block);
    }

    (blocks, warnings)
}

fn inline_blocks(document: &Document<'_>, index: usize) -> Option<Vec<StatementBlock>> {
    let line = document.line(index)?;
    if is_comment(line.trim()) || line.matches('[').count() != line.matches(']').count() {
        return None;
    }

    let pieces = split_statements(line);
    if pieces.is_empty() || (pieces.len() < 2 && !has_top_level_brace(line)) {
        return None;
    }

    let classified: Vec<_> = pieces
        .into_iter()
        .map(|range| {
            let kind = classify_line(&line[range.clone()]);
            (range, kind)
        })
        .collect();
    if classified.iter().all(|(_, kind)| *kind == StatementKind::Other) {
        return None;
    }

    Some(
        classified
            .into_iter()
            .map(|(range, kind)| StatementBlock {
                kind,
                span: Span::new(
                    document.position(index, range.start),
                    document.position(index, range.end),
                ),
                text: line[range].to_string(),
                inline: true,
            })
            .collect(),
    )
}
