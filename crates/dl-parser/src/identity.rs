use dl_core::{EdgeConnector, EdgeIdentity, LabelKey, Value, is_reserved_keyword};

use crate::attributes::statement_label;
use crate::classifier::{connector_at, read_endpoint};

/// One identity per consecutive endpoint pair of an edge statement, so
/// `a -> b -> c [label=x]` yields `a->b` and `b->c`, both labelled `x`.
/// Ports are dropped from the ids. Returns an empty list when the text does
/// not start with an edge.
#[must_use]
pub fn edge_identities(statement: &str) -> Vec<EdgeIdentity> {
    let Some(chain) = read_chain(statement) else {
        return Vec::new();
    };

    let label = statement_label(statement);
    chain
        .endpoints
        .windows(2)
        .zip(chain.connectors)
        .map(|(pair, connector)| EdgeIdentity {
            source: pair[0].clone(),
            connector,
            target: pair[1].clone(),
            label: label.clone(),
        })
        .collect()
}

/// Byte offset just past the last endpoint of a `source connector target`
/// chain, or `None` when the text does not start with an edge.
#[must_use]
pub fn edge_chain_end(statement: &str) -> Option<usize> {
    read_chain(statement).map(|chain| chain.end)
}

struct Chain {
    endpoints: Vec<String>,
    connectors: Vec<EdgeConnector>,
    end: usize,
}

fn read_chain(statement: &str) -> Option<Chain> {
    let start = skip_whitespace(statement, 0);
    let (first, mut end) = read_endpoint(statement, start)?;
    let mut endpoints = vec![first.into_string()];
    let mut connectors = Vec::new();

    loop {
        let at = skip_whitespace(statement, end);
        let Some(connector) = connector_at(&statement[at..]) else {
            break;
        };
        let target_start = skip_whitespace(statement, at + 2);
        let Some((target, target_end)) = read_endpoint(statement, target_start) else {
            break;
        };
        connectors.push(connector);
        endpoints.push(target.into_string());
        end = target_end;
    }

    (!connectors.is_empty()).then_some(Chain {
        endpoints,
        connectors,
        end,
    })
}

/// The statement's label, or the no-label sentinel.
#[must_use]
pub fn resolve_label(statement: &str) -> LabelKey {
    LabelKey::from_label(statement_label(statement).as_deref())
}

/// Id of a node statement. Keywords and `key = value` lines have none.
#[must_use]
pub fn node_id(statement: &str) -> Option<String> {
    let start = skip_whitespace(statement, 0);
    let (id, end) = read_endpoint(statement, start)?;
    if matches!(&id, Value::Bare(word) if is_reserved_keyword(word)) {
        return None;
    }
    if statement[end..].trim_start().starts_with('=') {
        return None;
    }
    Some(id.into_string())
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    from + (rest.len() - rest.trim_start().len())
}
