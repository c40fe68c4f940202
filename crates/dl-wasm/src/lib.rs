#![forbid(unsafe_code)]

use std::sync::{LazyLock, RwLock};

use dl_core::{
    ColorMap, DotlensError, EdgeSelection, LabelSet, LayoutEngine, LegendEntry, PalettePreset,
};
use dl_parser::{DefinitionRegistry, parse_document};
use dl_transform::{
    LabelCache, Prepared, apply_colors, color_map_for, extract_labels, filter_with_counts,
    prepare,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::wasm_bindgen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RuntimeConfig {
    palette: PalettePreset,
    layout: LayoutEngine,
    label_cache: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            palette: PalettePreset::default(),
            layout: LayoutEngine::default(),
            label_cache: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RuntimeInitConfig {
    palette: Option<String>,
    layout: Option<String>,
    label_cache: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PrepareRequest {
    selection: Vec<String>,
    color: bool,
    palette: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ColoredOutput {
    text: String,
    legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceOutput {
    text: String,
    labels: LabelSet,
    legend: Vec<LegendEntry>,
    edges_kept: usize,
    edges_removed: usize,
    layout: LayoutEngine,
}

static RUNTIME_CONFIG: LazyLock<RwLock<RuntimeConfig>> =
    LazyLock::new(|| RwLock::new(RuntimeConfig::default()));

fn read_runtime_config() -> RuntimeConfig {
    match RUNTIME_CONFIG.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_runtime_config(config: RuntimeConfig) {
    match RUNTIME_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

fn to_js_error(err: DotlensError) -> JsValue {
    js_error(err.to_string())
}

fn parse_js_value_or_default<T>(value: Option<JsValue>) -> Result<T, JsValue>
where
    T: for<'de> Deserialize<'de> + Default,
{
    match value {
        None => Ok(T::default()),
        Some(raw) if raw.is_undefined() || raw.is_null() => Ok(T::default()),
        Some(raw) => {
            #[cfg(target_arch = "wasm32")]
            {
                serde_wasm_bindgen::from_value(raw)
                    .map_err(|err| js_error(format!("invalid config: {err}")))
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = raw;
                Ok(T::default())
            }
        }
    }
}

fn to_js_value<T>(value: &T) -> Result<JsValue, JsValue>
where
    T: Serialize,
{
    #[cfg(target_arch = "wasm32")]
    {
        serde_wasm_bindgen::to_value(value)
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        serde_json::to_string(value)
            .map(|json| JsValue::from_str(&json))
            .map_err(|err| js_error(format!("failed to serialize response: {err}")))
    }
}

fn merge_runtime_config(
    base: RuntimeConfig,
    overrides: &RuntimeInitConfig,
) -> Result<RuntimeConfig, DotlensError> {
    let mut merged = base;
    if let Some(name) = overrides.palette.as_deref() {
        merged.palette = name.parse::<PalettePreset>()?;
    }
    if let Some(name) = overrides.layout.as_deref() {
        merged.layout = name.parse::<LayoutEngine>()?;
    }
    if let Some(value) = overrides.label_cache {
        merged.label_cache = value;
    }
    Ok(merged)
}

fn resolve_palette(
    name: Option<&str>,
    fallback: PalettePreset,
) -> Result<PalettePreset, DotlensError> {
    name.map_or(Ok(fallback), |name| name.parse().map_err(DotlensError::from))
}

fn prepare_request(
    input: &str,
    request: &PrepareRequest,
    runtime: RuntimeConfig,
) -> Result<Prepared, DotlensError> {
    let coloring = if request.color {
        Some(resolve_palette(request.palette.as_deref(), runtime.palette)?)
    } else {
        None
    };
    Ok(prepare(
        input,
        &EdgeSelection::from_values(&request.selection),
        coloring,
    ))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn init(config: Option<JsValue>) -> Result<(), JsValue> {
    let overrides: RuntimeInitConfig = parse_js_value_or_default(config)?;
    let next = merge_runtime_config(read_runtime_config(), &overrides).map_err(to_js_error)?;
    write_runtime_config(next);
    Ok(())
}

/// `{ nodes: {id: text}, edges: {key: text} }` for tooltip lookups.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parseDefinitions))]
pub fn parse_definitions_js(input: &str) -> Result<JsValue, JsValue> {
    to_js_value(&DefinitionRegistry::build(input))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = parseBlocks))]
pub fn parse_blocks_js(input: &str) -> Result<JsValue, JsValue> {
    to_js_value(&parse_document(input))
}

/// Sorted labels, the no-label sentinel included when present.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = edgeLabels))]
pub fn edge_labels_js(input: &str) -> Result<JsValue, JsValue> {
    to_js_value(&extract_labels(input))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = filterEdges))]
pub fn filter_edges_js(input: &str, selection: Vec<String>) -> String {
    dl_transform::filter_by_labels(input, &EdgeSelection::from_values(&selection))
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = colorEdges))]
pub fn color_edges_js(input: &str, palette: Option<String>) -> Result<JsValue, JsValue> {
    let preset = resolve_palette(palette.as_deref(), read_runtime_config().palette)
        .map_err(to_js_error)?;
    let colors = color_map_for(&extract_labels(input), preset);
    to_js_value(&ColoredOutput {
        text: apply_colors(input, &colors),
        legend: colors.legend(),
    })
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = prepare))]
pub fn prepare_js(input: &str, request: Option<JsValue>) -> Result<JsValue, JsValue> {
    let request: PrepareRequest = parse_js_value_or_default(request)?;
    let prepared =
        prepare_request(input, &request, read_runtime_config()).map_err(to_js_error)?;
    to_js_value(&prepared)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = layoutEngines))]
pub fn layout_engines_js() -> Vec<String> {
    LayoutEngine::ALL
        .iter()
        .map(|engine| engine.as_str().to_string())
        .collect()
}

/// Per-document session for an editor: caches labels by content and keeps
/// the colour map stable until the label set changes.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Debug, Default)]
pub struct Workspace {
    cache: LabelCache,
    colors: Option<(LabelSet, ColorMap)>,
    selection: Vec<String>,
    runtime: RuntimeConfig,
}

impl Workspace {
    fn with_runtime(runtime: RuntimeConfig) -> Self {
        Self {
            runtime,
            ..Self::default()
        }
    }

    fn labels_for(&mut self, input: &str) -> LabelSet {
        if self.runtime.label_cache {
            self.cache.labels(input).clone()
        } else {
            extract_labels(input)
        }
    }

    fn colors_for(&mut self, labels: &LabelSet) -> ColorMap {
        if let Some((cached, colors)) = &self.colors {
            if cached == labels {
                return colors.clone();
            }
        }
        let colors = color_map_for(labels, self.runtime.palette);
        self.colors = Some((labels.clone(), colors.clone()));
        colors
    }

    fn run(&mut self, input: &str, color: bool) -> WorkspaceOutput {
        let labels = self.labels_for(input);
        let filtered = filter_with_counts(input, &EdgeSelection::from_values(&self.selection));
        let (text, legend) = if color {
            let colors = self.colors_for(&labels);
            (apply_colors(&filtered.text, &colors), colors.legend())
        } else {
            (filtered.text, Vec::new())
        };
        WorkspaceOutput {
            text,
            labels,
            legend,
            edges_kept: filtered.edges_kept,
            edges_removed: filtered.edges_removed,
            layout: self.runtime.layout,
        }
    }

    fn change_palette(&mut self, name: &str) -> Result<(), DotlensError> {
        self.runtime.palette = name.parse()?;
        self.colors = None;
        Ok(())
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Workspace {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(config: Option<JsValue>) -> Result<Workspace, JsValue> {
        let overrides: RuntimeInitConfig = parse_js_value_or_default(config)?;
        let runtime =
            merge_runtime_config(read_runtime_config(), &overrides).map_err(to_js_error)?;
        Ok(Self::with_runtime(runtime))
    }

    pub fn labels(&mut self, input: &str) -> Result<JsValue, JsValue> {
        let labels = self.labels_for(input);
        to_js_value(&labels)
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = setSelection))]
    pub fn set_selection(&mut self, selection: Vec<String>) {
        self.selection = selection;
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(js_name = setPalette))]
    pub fn set_palette(&mut self, name: &str) -> Result<(), JsValue> {
        self.change_palette(name).map_err(to_js_error)
    }

    /// Filters by the current selection and, when `color` is set, colours
    /// edges with a map built from the whole document's labels.
    pub fn update(&mut self, input: &str, color: bool) -> Result<JsValue, JsValue> {
        let output = self.run(input, color);
        to_js_value(&output)
    }
}
