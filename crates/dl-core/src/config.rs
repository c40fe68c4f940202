use serde::{Deserialize, Serialize};

use crate::{DotlensError, LayoutEngine, PalettePreset};

/// 10 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_EXTENSIONS: &[&str] = &[".dot", ".gv"];

/// Settings shared by every dotlens surface. Missing keys fall back to
/// [`DotlensConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DotlensConfig {
    pub layout: LayoutEngine,
    pub palette: PalettePreset,
    pub max_input_bytes: usize,
    pub extensions: Vec<String>,
    pub graphviz_binary: String,
    pub label_cache: bool,
}

impl Default for DotlensConfig {
    fn default() -> Self {
        Self {
            layout: LayoutEngine::default(),
            palette: PalettePreset::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|extension| (*extension).to_string())
                .collect(),
            graphviz_binary: "dot".to_string(),
            label_cache: true,
        }
    }
}

impl DotlensConfig {
    pub fn validate(&self) -> Result<(), DotlensError> {
        if self.max_input_bytes == 0 {
            return Err(DotlensError::Config(
                "max_input_bytes must be greater than zero".to_string(),
            ));
        }
        if self.graphviz_binary.trim().is_empty() {
            return Err(DotlensError::Config(
                "graphviz_binary must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .extensions
            .iter()
            .find(|extension| !extension.starts_with('.') || extension.len() < 2)
        {
            return Err(DotlensError::Config(format!(
                "extension '{bad}' must start with '.'"
            )));
        }
        Ok(())
    }

    /// Case-insensitive suffix check against [`DotlensConfig::extensions`].
    #[must_use]
    pub fn accepts_file_name(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|extension| lower.ends_with(&extension.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn extension_list(&self) -> String {
        self.extensions.join(", ")
    }
}
