#![no_main]

use dl_core::{EdgeSelection, NO_LABEL_SENTINEL};
use dl_parser::parse_document;
use dl_transform::{extract_labels, filter_by_labels, filter_with_counts};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Keep every other label the document has, plus unlabelled edges.
    let labels = extract_labels(text).sorted();
    let mut picked: Vec<String> = labels
        .iter()
        .step_by(2)
        .map(|label| label.as_str().to_string())
        .collect();
    picked.push(NO_LABEL_SENTINEL.to_string());
    let selection = EdgeSelection::from_values(&picked);

    let outcome = filter_with_counts(text, &selection);
    let edges = parse_document(text).edges().count();
    assert_eq!(outcome.edges_kept + outcome.edges_removed, edges);

    assert_eq!(filter_by_labels(text, &EdgeSelection::All), text);
});
