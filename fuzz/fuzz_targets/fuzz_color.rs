#![no_main]

use dl_core::{EdgeSelection, PalettePreset};
use dl_transform::{apply_colors, color_map_for, extract_labels, prepare};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let colors = color_map_for(&extract_labels(text), PalettePreset::Default);
    let _ = apply_colors(text, &colors);

    let prepared = prepare(text, &EdgeSelection::All, Some(PalettePreset::HighContrast));
    assert!(prepared.legend.len() <= colors.len());
});
