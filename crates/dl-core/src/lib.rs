#![forbid(unsafe_code)]

//! Shared data model for the dotlens DOT text engine.
//!
//! Everything here is plain data: the parser produces [`StatementBlock`]s and
//! [`EdgeIdentity`]s, the transform crate consumes them and produces
//! [`LabelSet`]s and [`ColorMap`]s.

mod config;

pub use config::{DEFAULT_EXTENSIONS, DEFAULT_MAX_INPUT_BYTES, DotlensConfig};

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Reserved marker standing for "edge has no label attribute".
pub const NO_LABEL_SENTINEL: &str = "__no_label__";

/// Reserved selection value meaning "do not filter".
pub const ALL_SENTINEL: &str = "all";

/// Keywords that never name a node.
pub const RESERVED_KEYWORDS: &[&str] = &["graph", "digraph", "subgraph", "node", "edge", "strict"];

#[must_use]
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(word))
}

/// A location in a document. `line` and `col` are 0-based; `col` and `byte`
/// count bytes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
    pub byte: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, col: usize, byte: usize) -> Self {
        Self { line, col, byte }
    }
}

/// Half-open byte range `[start, end)` with line/column bookkeeping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.byte.saturating_sub(self.start.byte)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded attribute value. Equality, hashing and display only look at the
/// inner text, never at the delimiters it was written with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", content = "text", rename_all = "lowercase")]
pub enum Value {
    /// `abc-1.2`
    Bare(String),
    /// `"a b"`
    Quoted(String),
    /// `<b>x</b>`
    Bracketed(String),
}

impl Value {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bare(text) | Self::Quoted(text) | Self::Bracketed(text) => text,
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Bare(text) | Self::Quoted(text) | Self::Bracketed(text) => text,
        }
    }

    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Bare(_) => "bare",
            Self::Quoted(_) => "quoted",
            Self::Bracketed(_) => "bracketed",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `key = value` pair of an attribute list, in source order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

impl Attribute {
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Node,
    Edge,
    #[default]
    Other,
}

impl StatementKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Other => "other",
        }
    }
}

/// The resolved source range and kind of one statement.
///
/// Whole-line blocks cover `start_line..=end_line` completely. Inline blocks
/// (`inline == true`) cover one statement piece of a compact line such as
/// `digraph G { a -> b; b -> c; }` and never span lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementBlock {
    pub kind: StatementKind,
    pub span: Span,
    pub text: String,
    pub inline: bool,
}

impl StatementBlock {
    #[must_use]
    pub const fn start_line(&self) -> usize {
        self.span.start.line
    }

    /// Inclusive.
    #[must_use]
    pub const fn end_line(&self) -> usize {
        self.span.end.line
    }

    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.span.end.line - self.span.start.line + 1
    }

    #[must_use]
    pub fn is_edge(&self) -> bool {
        self.kind == StatementKind::Edge
    }

    #[must_use]
    pub fn is_node(&self) -> bool {
        self.kind == StatementKind::Node
    }
}

/// Edge connector, kept as written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum EdgeConnector {
    /// `->`
    #[default]
    Directed,
    /// `--`
    Undirected,
}

impl EdgeConnector {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directed => "->",
            Self::Undirected => "--",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "->" => Some(Self::Directed),
            "--" => Some(Self::Undirected),
            _ => None,
        }
    }
}

/// Identity of one source/target pair of an edge statement. A single
/// identity yields several lookup keys; see [`EdgeIdentity::lookup_keys`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EdgeIdentity {
    pub source: String,
    pub connector: EdgeConnector,
    pub target: String,
    pub label: Option<String>,
}

impl EdgeIdentity {
    /// `source-label-target`, present only for labelled edges.
    #[must_use]
    pub fn triplet_key(&self) -> Option<String> {
        self.label
            .as_ref()
            .map(|label| format!("{}-{label}-{}", self.source, self.target))
    }

    #[must_use]
    pub fn arrow_key(&self) -> String {
        format!("{}->{}", self.source, self.target)
    }

    #[must_use]
    pub fn spaced_key(&self) -> String {
        format!("{} {}", self.source, self.target)
    }

    #[must_use]
    pub fn raw_key(&self) -> String {
        format!("{}{}{}", self.source, self.connector.as_str(), self.target)
    }

    /// Keys in registration priority order, deduplicated.
    #[must_use]
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(4);
        if let Some(triplet) = self.triplet_key() {
            keys.push(triplet);
        }
        for key in [self.arrow_key(), self.spaced_key(), self.raw_key()] {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    #[must_use]
    pub fn label_key(&self) -> LabelKey {
        LabelKey::from_label(self.label.as_deref())
    }
}

/// An edge "type": either a literal label or the no-label sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Label(String),
    NoLabel,
}

impl LabelKey {
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        label.map_or(Self::NoLabel, |text| Self::Label(text.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(text) => text,
            Self::NoLabel => NO_LABEL_SENTINEL,
        }
    }

    /// Human-facing text for legends and menus.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Label(text) => text,
            Self::NoLabel => "No label",
        }
    }

    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::NoLabel)
    }
}

impl From<&str> for LabelKey {
    fn from(value: &str) -> Self {
        if value == NO_LABEL_SENTINEL {
            Self::NoLabel
        } else {
            Self::Label(value.to_string())
        }
    }
}

impl From<String> for LabelKey {
    fn from(value: String) -> Self {
        if value == NO_LABEL_SENTINEL {
            Self::NoLabel
        } else {
            Self::Label(value)
        }
    }
}

// Lexicographic over the string form, so the sentinel sorts where
// "__no_label__" would. A literal label spelled like the sentinel sorts after it.
impl Ord for LabelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str()).then_with(|| match (self, other) {
            (Self::NoLabel, Self::Label(_)) => Ordering::Less,
            (Self::Label(_), Self::NoLabel) => Ordering::Greater,
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for LabelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LabelKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LabelKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// Distinct edge labels of a document. Insertion order is incidental; read
/// through [`LabelSet::sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    keys: FxHashSet<LabelKey>,
}

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the key was not present yet.
    pub fn insert(&mut self, key: LabelKey) -> bool {
        self.keys.insert(key)
    }

    #[must_use]
    pub fn contains(&self, key: &LabelKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn has_unlabeled(&self) -> bool {
        self.keys.contains(&LabelKey::NoLabel)
    }

    #[must_use]
    pub fn sorted(&self) -> Vec<LabelKey> {
        let mut keys: Vec<LabelKey> = self.keys.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Sorted literal labels, sentinel excluded.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.sorted()
            .into_iter()
            .filter_map(|key| match key {
                LabelKey::Label(text) => Some(text),
                LabelKey::NoLabel => None,
            })
            .collect()
    }
}

impl FromIterator<LabelKey> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

/// Which edges survive filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EdgeSelection {
    #[default]
    All,
    Only(FxHashSet<LabelKey>),
}

impl EdgeSelection {
    /// Builds a selection from caller-supplied strings. An empty input, or
    /// any value equal to [`ALL_SENTINEL`], selects everything.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = FxHashSet::default();
        for value in values {
            let value = value.as_ref();
            if value == ALL_SENTINEL {
                return Self::All;
            }
            keys.insert(LabelKey::from(value));
        }
        if keys.is_empty() {
            Self::All
        } else {
            Self::Only(keys)
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    #[must_use]
    pub fn admits(&self, key: &LabelKey) -> bool {
        match self {
            Self::All => true,
            Self::Only(keys) => keys.contains(key),
        }
    }
}

/// One row of a colour legend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegendEntry {
    pub key: LabelKey,
    pub display: String,
    pub color: String,
}

/// Label (or sentinel) to colour string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorMap {
    entries: BTreeMap<LabelKey, String>,
}

impl ColorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: LabelKey, color: impl Into<String>) {
        self.entries.insert(key, color.into());
    }

    #[must_use]
    pub fn get(&self, key: &LabelKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LabelKey, &str)> {
        self.entries.iter().map(|(key, color)| (key, color.as_str()))
    }

    /// Legend rows in label order.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.entries
            .iter()
            .map(|(key, color)| LegendEntry {
                key: key.clone(),
                display: key.display_name().to_string(),
                color: color.clone(),
            })
            .collect()
    }
}

/// Graphviz layout engines the renderer collaborator accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngine {
    #[default]
    Dot,
    Neato,
    Fdp,
    Circo,
    Twopi,
}

impl LayoutEngine {
    pub const ALL: [Self; 5] = [Self::Dot, Self::Neato, Self::Fdp, Self::Circo, Self::Twopi];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Neato => "neato",
            Self::Fdp => "fdp",
            Self::Circo => "circo",
            Self::Twopi => "twopi",
        }
    }
}

impl fmt::Display for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutEngine {
    type Err = DotlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|engine| engine.as_str() == lower)
            .ok_or_else(|| DotlensError::UnknownLayoutEngine(s.to_string()))
    }
}

/// Colour palette presets. The colour lists live with the colour assigner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PalettePreset {
    /// Forty vivid colours, most distinguishable first.
    #[default]
    Default,
    /// Colour-blind safe hues, then dark/light variants.
    HighContrast,
    /// Desaturated tones for print.
    Muted,
}

/// Error type for palette preset parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePalettePresetError(String);

impl fmt::Display for ParsePalettePresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown palette preset: {} (expected default, high-contrast or muted)",
            self.0
        )
    }
}

impl std::error::Error for ParsePalettePresetError {}

impl FromStr for PalettePreset {
    type Err = ParsePalettePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "vivid" => Ok(Self::Default),
            "high-contrast" | "highcontrast" => Ok(Self::HighContrast),
            "muted" => Ok(Self::Muted),
            _ => Err(ParsePalettePresetError(s.to_string())),
        }
    }
}

impl PalettePreset {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::HighContrast => "high-contrast",
            Self::Muted => "muted",
        }
    }
}

#[derive(Debug, Error)]
pub enum DotlensError {
    #[error("unknown layout engine '{0}'; expected one of dot, neato, fdp, circo, twopi")]
    UnknownLayoutEngine(String),
    #[error(transparent)]
    Palette(#[from] ParsePalettePresetError),
    #[error("input is empty")]
    EmptyInput,
    #[error("input is too large: {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },
    #[error("unsupported file extension for '{name}'; expected one of {expected}")]
    UnsupportedExtension { name: String, expected: String },
    #[error("{engine} render failed: {message}")]
    Render {
        engine: LayoutEngine,
        message: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

/// The external layout/rendering engine. Implementations receive the
/// engine's output text and return a rendered image (SVG text).
pub trait GraphRenderer {
    fn render(&self, source: &str, engine: LayoutEngine) -> Result<String, DotlensError>;
}
