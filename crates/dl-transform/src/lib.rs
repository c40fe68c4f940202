#![forbid(unsafe_code)]

//! Label indexing, edge filtering and edge colouring over DOT text.
//!
//! Every operation takes a document and returns a new one; nothing here
//! mutates shared state except the opt-in [`LabelCache`].

mod color;
mod filter;
mod labels;
pub mod palette;
mod rewrite;

use dl_core::{EdgeSelection, LegendEntry, PalettePreset};
use serde::Serialize;
use tracing::debug;

pub use color::{apply_colors, assign_colors, color_map_for, color_statement};
pub use filter::{FilterOutcome, filter_by_labels, filter_with_counts};
pub use labels::{LabelCache, extract_labels};

/// Output of [`prepare`]: the text to hand to the renderer plus what a UI
/// needs to describe it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prepared {
    pub text: String,
    pub legend: Vec<LegendEntry>,
    pub edges_kept: usize,
    pub edges_removed: usize,
}

/// Filters by `selection`, then, when `coloring` is set, colours the edges
/// that survived by their label.
#[must_use]
pub fn prepare(text: &str, selection: &EdgeSelection, coloring: Option<PalettePreset>) -> Prepared {
    let filtered = filter_with_counts(text, selection);

    let (text, legend) = match coloring {
        Some(preset) => {
            let colors = color_map_for(&extract_labels(&filtered.text), preset);
            (apply_colors(&filtered.text, &colors), colors.legend())
        }
        None => (filtered.text, Vec::new()),
    };

    debug!(
        edges_kept = filtered.edges_kept,
        edges_removed = filtered.edges_removed,
        legend_entries = legend.len(),
        "prepared document"
    );
    Prepared {
        text,
        legend,
        edges_kept: filtered.edges_kept,
        edges_removed: filtered.edges_removed,
    }
}
