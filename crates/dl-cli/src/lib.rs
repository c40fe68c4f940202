#![forbid(unsafe_code)]

//! Support code for the `dotlens` binary: configuration discovery, input
//! loading and the Graphviz-backed [`GraphRenderer`].

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use dl_core::{DotlensConfig, DotlensError, GraphRenderer, LayoutEngine};
use dl_parser::{SourceReport, validate_source};
use tracing::{debug, info};

/// Looked up in the working directory before the platform config dir.
pub const LOCAL_CONFIG_FILE: &str = "dotlens.toml";

const SYSTEM_CONFIG_FILE: &str = "config.toml";

// =============================================================================
// Configuration
// =============================================================================

/// Finds and loads the configuration.
///
/// Search order:
/// 1. `explicit`, which must exist
/// 2. `./dotlens.toml`
/// 3. `config.toml` in the platform config directory
/// 4. [`DotlensConfig::default`]
pub fn load_config(explicit: Option<&Path>) -> Result<DotlensConfig, DotlensError> {
    let system_dir = ProjectDirs::from("org", "dotlens", "dotlens")
        .map(|dirs| dirs.config_dir().to_path_buf());
    if system_dir.is_none() {
        debug!("Could not determine platform-specific config directory");
    }
    resolve_config(explicit, Path::new("."), system_dir.as_deref())
}

/// [`load_config`] with the local and platform directories supplied.
pub fn resolve_config(
    explicit: Option<&Path>,
    local_dir: &Path,
    system_dir: Option<&Path>,
) -> Result<DotlensConfig, DotlensError> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local = local_dir.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        info!(path = %local.display(), "Loading configuration from local path");
        return load_config_file(&local);
    }

    if let Some(dir) = system_dir {
        let system = dir.join(SYSTEM_CONFIG_FILE);
        if system.is_file() {
            info!(path = %system.display(), "Loading configuration from system path");
            return load_config_file(&system);
        }
        debug!(path = %system.display(), "System configuration file not found");
    }

    debug!("No configuration file found, using default configuration");
    Ok(DotlensConfig::default())
}

pub fn load_config_file(path: &Path) -> Result<DotlensConfig, DotlensError> {
    if !path.exists() {
        return Err(DotlensError::Config(format!(
            "missing configuration file: {}",
            path.display()
        )));
    }
    let content = fs::read_to_string(path).map_err(|err| {
        DotlensError::Config(format!("failed to read {}: {err}", path.display()))
    })?;
    parse_config(&content)
}

/// Parses TOML and validates the result.
pub fn parse_config(content: &str) -> Result<DotlensConfig, DotlensError> {
    let config: DotlensConfig = toml::from_str(content)
        .map_err(|err| DotlensError::Config(format!("failed to parse TOML: {err}")))?;
    config.validate()?;
    Ok(config)
}

// =============================================================================
// Input
// =============================================================================

/// Document text plus the file name it came from, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: Option<String>,
    pub text: String,
}

/// `-` reads stdin, an existing path reads the file, anything else is
/// taken as inline DOT text.
pub fn load_source(input: &str) -> Result<Source> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read from stdin")?;
        return Ok(Source { name: None, text });
    }

    let path = Path::new(input);
    if path.is_file() {
        let text = fs::read_to_string(path).context(format!("Failed to read file: {input}"))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        return Ok(Source { name, text });
    }

    Ok(Source {
        name: None,
        text: input.to_string(),
    })
}

/// Loads `input` and runs the file-loading checks against `config`.
pub fn load_checked(input: &str, config: &DotlensConfig) -> Result<(Source, SourceReport)> {
    let source = load_source(input)?;
    let report = validate_source(source.name.as_deref(), &source.text, config)
        .context(format!("Rejected input: {}", display_input(input)))?;
    Ok((source, report))
}

fn display_input(input: &str) -> &str {
    if input == "-" {
        "<stdin>"
    } else if input.contains('\n') || input.len() > 60 {
        "<inline>"
    } else {
        input
    }
}

pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).context(format!("Failed to write to: {}", path.display()))?;
            info!("Wrote output to: {}", path.display());
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders by piping the document into `<binary> -K<engine> -Tsvg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphvizCommand {
    binary: PathBuf,
}

impl GraphvizCommand {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &DotlensConfig) -> Self {
        Self::new(&config.graphviz_binary)
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn args(engine: LayoutEngine) -> [String; 2] {
        [format!("-K{engine}"), "-Tsvg".to_string()]
    }
}

impl GraphRenderer for GraphvizCommand {
    fn render(&self, source: &str, engine: LayoutEngine) -> Result<String, DotlensError> {
        let failure = |message: String| DotlensError::Render { engine, message };

        debug!(binary = %self.binary.display(), %engine, bytes = source.len(), "spawning renderer");
        let mut child = Command::new(&self.binary)
            .args(Self::args(engine))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| failure(format!("failed to start {}: {err}", self.binary.display())))?;

        // Graphviz reads all of stdin before writing, so a blocking write
        // cannot deadlock against a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|err| failure(format!("failed to write input: {err}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|err| failure(format!("failed to wait for renderer: {err}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(failure(if detail.is_empty() {
                format!("renderer exited with {}", output.status)
            } else {
                detail.to_string()
            }));
        }

        String::from_utf8(output.stdout)
            .map_err(|err| failure(format!("renderer produced invalid UTF-8: {err}")))
    }
}
