use std::ops::Range;

use dl_core::{Attribute, Value};

use crate::tokenizer::{tokenize_value, word_len};

/// An attribute with the byte range of its `key = value` text inside the
/// scanned body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAttribute {
    pub attribute: Attribute,
    pub range: Range<usize>,
}

/// Top-level `[...]` list of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeList {
    /// Byte offset of `[`.
    pub open: usize,
    /// Byte offset of the matching `]`; `None` when the list is never closed.
    pub close: Option<usize>,
}

impl AttributeList {
    #[must_use]
    pub fn body_range(&self, statement_len: usize) -> Range<usize> {
        self.open + 1..self.close.unwrap_or(statement_len)
    }
}

/// Ordered attributes of a list body (the text between `[` and `]`).
#[must_use]
pub fn extract_attributes(body: &str) -> Vec<Attribute> {
    scan_attributes(body)
        .into_iter()
        .map(|scanned| scanned.attribute)
        .collect()
}

/// Scans `key = value` pairs, skipping `,`, `;` and whitespace between them.
///
/// Anything that does not form a pair is skipped one character (or one
/// word) at a time; the scan never fails.
#[must_use]
pub fn scan_attributes(body: &str) -> Vec<ScannedAttribute> {
    let mut scanned = Vec::new();
    let mut pos = 0;

    while let Some(ch) = body[pos..].chars().next() {
        if ch.is_whitespace() || ch == ',' || ch == ';' {
            pos += ch.len_utf8();
            continue;
        }

        let key_len = word_len(&body[pos..]);
        if key_len == 0 {
            pos += ch.len_utf8();
            continue;
        }
        let key_end = pos + key_len;
        let eq = skip_whitespace(body, key_end);
        if !body[eq..].starts_with('=') {
            pos = key_end;
            continue;
        }

        let value_start = skip_whitespace(body, eq + 1);
        match read_value(&body[value_start..]) {
            Some((value, consumed)) => {
                let end = value_start + consumed;
                scanned.push(ScannedAttribute {
                    attribute: Attribute::new(&body[pos..key_end], value),
                    range: pos..end,
                });
                pos = end;
            }
            None => pos = value_start,
        }
    }

    scanned
}

/// The first `label` attribute. The key match is exact.
#[must_use]
pub fn label_of(attributes: &[Attribute]) -> Option<&Value> {
    attributes
        .iter()
        .find(|attribute| attribute.key == "label")
        .map(|attribute| &attribute.value)
}

/// Every top-level attribute list of a statement, in order.
///
/// Brackets inside quoted strings, and inside angle spans within a list, do
/// not count.
#[must_use]
pub fn find_attribute_lists(statement: &str) -> Vec<AttributeList> {
    let mut lists = Vec::new();
    let mut in_quote = false;
    let mut angle = 0usize;
    let mut depth = 0usize;
    let mut open = 0;

    for (idx, ch) in statement.char_indices() {
        if in_quote {
            if ch == '"' {
                in_quote = false;
            }
            continue;
        }
        match ch {
            '"' => in_quote = true,
            '<' if depth > 0 => angle += 1,
            '>' if angle > 0 => angle -= 1,
            '[' if angle == 0 => {
                if depth == 0 {
                    open = idx;
                }
                depth += 1;
            }
            ']' if angle == 0 && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    lists.push(AttributeList {
                        open,
                        close: Some(idx),
                    });
                }
            }
            _ => {}
        }
    }

    if depth > 0 {
        lists.push(AttributeList { open, close: None });
    }
    lists
}

/// Attributes of all lists of a statement, in source order.
#[must_use]
pub fn statement_attributes(statement: &str) -> Vec<Attribute> {
    find_attribute_lists(statement)
        .iter()
        .flat_map(|list| extract_attributes(&statement[list.body_range(statement.len())]))
        .collect()
}

#[must_use]
pub fn statement_label(statement: &str) -> Option<String> {
    label_of(&statement_attributes(statement)).map(|value| value.as_str().to_string())
}

/// Byte range (in statement coordinates) of the first attribute whose key
/// matches `key` case-insensitively.
#[must_use]
pub fn locate_attribute(statement: &str, key: &str) -> Option<Range<usize>> {
    find_attribute_lists(statement).iter().find_map(|list| {
        let body = list.body_range(statement.len());
        scan_attributes(&statement[body.clone()])
            .into_iter()
            .find(|scanned| scanned.attribute.key.eq_ignore_ascii_case(key))
            .map(|scanned| body.start + scanned.range.start..body.start + scanned.range.end)
    })
}

fn read_value(input: &str) -> Option<(Value, usize)> {
    if input.starts_with('"') || input.starts_with('<') {
        return tokenize_value(input);
    }
    let len = bare_value_len(input);
    (len > 0).then(|| (Value::Bare(input[..len].to_string()), len))
}

// A bare value runs to the next separator or `]`. Whitespace ends it only
// when what follows is another `key =` pair or a separator.
fn bare_value_len(input: &str) -> usize {
    for (idx, ch) in input.char_indices() {
        if matches!(ch, ',' | ';' | ']') {
            return idx;
        }
        if ch.is_whitespace() {
            let rest = input[idx..].trim_start();
            if rest.is_empty() || rest.starts_with([',', ';', ']']) || starts_with_assignment(rest) {
                return idx;
            }
        }
    }
    input.len()
}

fn starts_with_assignment(input: &str) -> bool {
    let key_len = word_len(input);
    key_len > 0 && input[key_len..].trim_start().starts_with('=')
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..]
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map_or(text.len(), |(idx, _)| from + idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(body: &str) -> Vec<(String, String)> {
        extract_attributes(body)
            .into_iter()
            .map(|attribute| (attribute.key, attribute.value.into_string()))
            .collect()
    }

    #[test]
    fn extracts_mixed_value_shapes_in_order() {
        let attributes = extract_attributes(r#"label="a, b", shape=box; tip=<i>x</i>"#);
        assert_eq!(attributes.len(), 3);
        assert!(matches!(&attributes[0].value, Value::Quoted(text) if text == "a, b"));
        assert!(matches!(&attributes[1].value, Value::Bare(text) if text == "box"));
        assert!(matches!(&attributes[2].value, Value::Bracketed(text) if text == "i"));
    }

    #[test]
    fn space_separated_pairs_split_on_the_next_key() {
        assert_eq!(
            pairs("color=red label=x"),
            vec![
                ("color".to_string(), "red".to_string()),
                ("label".to_string(), "x".to_string())
            ]
        );
    }

    #[test]
    fn bare_values_may_carry_inner_words_and_symbols() {
        assert_eq!(
            pairs("label=hello world, bgcolor=#ff0000"),
            vec![
                ("label".to_string(), "hello world".to_string()),
                ("bgcolor".to_string(), "#ff0000".to_string())
            ]
        );
    }

    #[test]
    fn trailing_garbage_is_ignored() {
        assert_eq!(
            pairs("shape=box, bold, =x, label=\"open"),
            vec![("shape".to_string(), "box".to_string())]
        );
        assert!(extract_attributes("").is_empty());
        assert!(extract_attributes(", ;  ").is_empty());
    }

    #[test]
    fn label_accessor_matches_the_exact_key() {
        let attributes = extract_attributes("xlabel=a, headlabel=b, label=c");
        assert_eq!(label_of(&attributes).map(Value::as_str), Some("c"));
        assert_eq!(statement_label("a -> b [xlabel=only]"), None);
    }

    #[test]
    fn finds_lists_outside_quotes() {
        let statement = r#""n[1]" -> b [label="x]"] [color=red]"#;
        let lists = find_attribute_lists(statement);
        assert_eq!(lists.len(), 2);
        assert_eq!(&statement[lists[0].body_range(statement.len())], r#"label="x]""#);
        assert_eq!(&statement[lists[1].body_range(statement.len())], "color=red");
    }

    #[test]
    fn unclosed_list_runs_to_the_end() {
        let statement = "a -> b [label=x,";
        let lists = find_attribute_lists(statement);
        assert_eq!(lists, vec![AttributeList { open: 7, close: None }]);
        assert_eq!(statement_label(statement).as_deref(), Some("x"));
    }

    #[test]
    fn locates_attribute_ranges_case_insensitively() {
        let statement = "a -> b [label=x, COLOR = \"red\"]";
        let range = locate_attribute(statement, "color").expect("color present");
        assert_eq!(&statement[range], "COLOR = \"red\"");
        assert_eq!(locate_attribute(statement, "penwidth"), None);
    }
}
