use std::ops::Range;

/// Splits text into top-level statement pieces.
///
/// Pieces end at `;`, `{` and `}` that sit outside quotes, angle spans and
/// attribute lists. Separators are not part of any piece. Returned ranges
/// are trimmed and never empty.
#[must_use]
pub fn split_statements(text: &str) -> Vec<Range<usize>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quote = false;
    let mut angle = 0usize;
    let mut bracket = 0usize;

    for (idx, ch) in text.char_indices() {
        if in_quote {
            if ch == '"' {
                in_quote = false;
            }
            continue;
        }
        match ch {
            '"' => in_quote = true,
            '<' if bracket > 0 => angle += 1,
            '>' if angle > 0 => angle -= 1,
            '[' if angle == 0 => bracket += 1,
            ']' if angle == 0 => bracket = bracket.saturating_sub(1),
            ';' | '{' | '}' if bracket == 0 && angle == 0 => {
                push_trimmed(text, start..idx, &mut pieces);
                start = idx + 1;
            }
            _ => {}
        }
    }
    push_trimmed(text, start..text.len(), &mut pieces);
    pieces
}

/// True when `text` holds a `{` or `}` outside quotes.
#[must_use]
pub fn has_top_level_brace(text: &str) -> bool {
    let mut in_quote = false;
    text.chars().any(|ch| {
        if ch == '"' {
            in_quote = !in_quote;
            return false;
        }
        !in_quote && matches!(ch, '{' | '}')
    })
}

fn push_trimmed(text: &str, range: Range<usize>, pieces: &mut Vec<Range<usize>>) {
    let slice = &text[range.clone()];
    let trimmed_start = slice.len() - slice.trim_start().len();
    let trimmed_end = slice.trim_end().len();
    if trimmed_end > trimmed_start {
        pieces.push(range.start + trimmed_start..range.start + trimmed_end);
    }
}
