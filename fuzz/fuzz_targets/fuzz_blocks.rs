#![no_main]

use dl_parser::{DefinitionRegistry, parse_document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let parsed = parse_document(text);
    let lines = text.split('\n').count();
    for block in &parsed.blocks {
        assert!(block.start_line() <= block.end_line());
        assert!(block.end_line() < lines);
        if block.inline {
            assert_eq!(block.start_line(), block.end_line());
        }
    }

    let registry = DefinitionRegistry::build(text);
    for key in registry.edges().keys() {
        let _ = registry.find_edge(key);
    }
});
