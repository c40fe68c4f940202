use dl_core::Value;

/// Reads one value at the start of `input`, returning it with the number of
/// bytes consumed.
///
/// Shapes are tried in order: `"quoted"` (no escape handling), `<angle>`
/// (closes at the first `>`), then a bare run of alphanumerics, `_`, `-` and
/// `.`. An unterminated quote or angle span falls through to the bare rule,
/// which cannot start on a delimiter, so the result is `None`.
#[must_use]
pub fn tokenize_value(input: &str) -> Option<(Value, usize)> {
    tokenize(input, false)
}

/// Same as [`tokenize_value`], except a bare token stops before an edge
/// connector so that `a->b` reads as `a`.
#[must_use]
pub fn tokenize_id(input: &str) -> Option<(Value, usize)> {
    tokenize(input, true)
}

fn tokenize(input: &str, stop_at_connector: bool) -> Option<(Value, usize)> {
    if let Some(rest) = input.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            return Some((Value::Quoted(rest[..end].to_string()), end + 2));
        }
    } else if let Some(rest) = input.strip_prefix('<') {
        if let Some(end) = rest.find('>') {
            return Some((Value::Bracketed(rest[..end].to_string()), end + 2));
        }
    }

    let len = bare_len(input, stop_at_connector);
    (len > 0).then(|| (Value::Bare(input[..len].to_string()), len))
}

pub(crate) fn is_bare_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Length in bytes of the leading `\w+` run.
pub(crate) fn word_len(input: &str) -> usize {
    input
        .char_indices()
        .find(|(_, ch)| !is_word_char(*ch))
        .map_or(input.len(), |(idx, _)| idx)
}

fn bare_len(input: &str, stop_at_connector: bool) -> usize {
    let bytes = input.as_bytes();
    for (idx, ch) in input.char_indices() {
        if !is_bare_char(ch) {
            return idx;
        }
        if stop_at_connector && ch == '-' && matches!(bytes.get(idx + 1), Some(b'>' | b'-')) {
            return idx;
        }
    }
    input.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_value_keeps_inner_spaces() {
        let (value, consumed) = tokenize_value("\"a b\", x").expect("quoted");
        assert_eq!(value, Value::Quoted("a b".to_string()));
        assert!(matches!(value, Value::Quoted(_)));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn angle_value_closes_at_first_gt() {
        let (value, consumed) = tokenize_value("<b>x</b>").expect("angle");
        assert!(matches!(&value, Value::Bracketed(inner) if inner == "b"));
        assert_eq!(consumed, 3);
    }

    #[test]
    fn bare_value_is_maximal() {
        let (value, consumed) = tokenize_value("abc-1.2, next").expect("bare");
        assert!(matches!(&value, Value::Bare(inner) if inner == "abc-1.2"));
        assert_eq!(consumed, 7);
    }

    #[test]
    fn unterminated_delimiters_do_not_match() {
        assert_eq!(tokenize_value("\"abc"), None);
        assert_eq!(tokenize_value("<abc"), None);
        assert_eq!(tokenize_value(""), None);
        assert_eq!(tokenize_value(", x"), None);
    }

    #[test]
    fn ids_stop_before_connectors() {
        let (value, consumed) = tokenize_id("a->b").expect("id");
        assert_eq!(value.as_str(), "a");
        assert_eq!(consumed, 1);

        let (value, _) = tokenize_id("node-1--x").expect("id");
        assert_eq!(value.as_str(), "node-1");

        let (value, _) = tokenize_value("a->b").expect("value");
        assert_eq!(value.as_str(), "a-");
    }

    #[test]
    fn word_len_counts_bytes() {
        assert_eq!(word_len("größe=1"), "größe".len());
        assert_eq!(word_len("=x"), 0);
    }
}
