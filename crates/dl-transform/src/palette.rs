//! Fixed colour lists for edge-label colouring.
//!
//! Each list starts with its most distinguishable entries; assignment cycles
//! through it, so order matters more than length.

use dl_core::PalettePreset;

/// Vivid palette, highest pairwise contrast first.
pub const DEFAULT_PALETTE: [&str; 40] = [
    "#FF6B6B", // Coral red
    "#4ECDC4", // Turquoise
    "#45B7D1", // Sky blue
    "#96CEB4", // Sage
    "#FECA57", // Sunflower
    "#FF9FF3", // Pink
    "#54A0FF", // Azure
    "#5F27CD", // Deep violet
    "#00D2D3", // Cyan
    "#FF9F43", // Orange
    "#FF6348", // Tomato
    "#2ED573", // Green
    "#3742FA", // Royal blue
    "#A55EEA", // Lavender
    "#26D0CE", // Aqua
    "#FFA502", // Amber
    "#FF3838", // Red
    "#1DD1A1", // Mint
    "#5352ED", // Indigo
    "#FC427B", // Raspberry
    "#2F3542", // Charcoal
    "#40407A", // Slate indigo
    "#706FD3", // Periwinkle
    "#F8B500", // Gold
    "#B33771", // Plum
    "#3D5A80", // Steel blue
    "#EE6C4D", // Burnt sienna
    "#3A86FF", // Bright blue
    "#06FFA5", // Spring green
    "#FFBE0B", // Yellow
    "#FB8500", // Tangerine
    "#8ECAE6", // Powder blue
    "#219EBC", // Cerulean
    "#023047", // Navy
    "#FFB3C6", // Blush
    "#FB8B24", // Pumpkin
    "#D62828", // Crimson
    "#F77F00", // Dark orange
    "#FCBF49", // Marigold
    "#003566", // Midnight
];

/// Okabe-Ito colour-blind safe hues, then Tol's bright set.
pub const HIGH_CONTRAST_PALETTE: [&str; 15] = [
    "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7", "#000000",
    "#4477AA", "#EE6677", "#228833", "#CCBB44", "#66CCEE", "#AA3377", "#BBBBBB",
];

/// Tol's muted set.
pub const MUTED_PALETTE: [&str; 10] = [
    "#CC6677", "#332288", "#DDCC77", "#117733", "#88CCEE", "#882255", "#44AA99", "#999933",
    "#AA4499", "#DDDDDD",
];

#[must_use]
pub const fn palette(preset: PalettePreset) -> &'static [&'static str] {
    match preset {
        PalettePreset::Default => &DEFAULT_PALETTE,
        PalettePreset::HighContrast => &HIGH_CONTRAST_PALETTE,
        PalettePreset::Muted => &MUTED_PALETTE,
    }
}

/// Colour for the `index`-th label, cycling once the palette runs out.
#[must_use]
pub fn color_at(preset: PalettePreset, index: usize) -> &'static str {
    let colors = palette(preset);
    colors[index % colors.len()]
}
