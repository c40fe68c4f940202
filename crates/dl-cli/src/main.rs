#![forbid(unsafe_code)]

//! dotlens CLI - inspect, filter and colour Graphviz DOT edges by label.
//!
//! # Commands
//!
//! - `labels`: List the distinct edge labels of a document
//! - `filter`: Keep only edges whose label is selected
//! - `color`: Colour edges by label (optionally after filtering)
//! - `legend`: Show the label-to-colour legend
//! - `defs`: Look up node/edge definitions as shown in tooltips
//! - `blocks`: Dump the statement blocks as JSON
//! - `validate`: Check that input is loadable and report diagnostics
//! - `render`: Filter, colour and render to SVG through Graphviz

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dl_cli::{GraphvizCommand, Source, load_checked, load_config, write_output};
use dl_core::{
    DotlensConfig, EdgeSelection, GraphRenderer, LayoutEngine, NO_LABEL_SENTINEL, PalettePreset,
};
use dl_parser::{DefinitionRegistry, DocumentStats, SourceReport, parse_document, validate_source};
use dl_transform::{extract_labels, filter_with_counts, prepare};
use serde::Serialize;
use tracing::{debug, info, warn};

/// dotlens CLI - inspect, filter and colour Graphviz DOT edges by label.
#[derive(Debug, Parser)]
#[command(
    name = "dotlens",
    version,
    about = "Inspect, filter and colour Graphviz DOT edges by label",
    long_about = "Works on DOT source text line by line: lists edge labels,\n\
        filters edges by label, colours them with a stable palette and\n\
        hands the result to Graphviz for rendering."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (default: ./dotlens.toml, then the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the distinct edge labels, sorted.
    Labels {
        /// Input file path, "-" for stdin, or inline DOT text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep only edges whose label is selected. No selection keeps everything.
    Filter {
        #[arg(default_value = "-")]
        input: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Colour edges by label.
    Color {
        #[arg(default_value = "-")]
        input: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Palette (default, high-contrast, muted). Overrides the config file.
        #[arg(short, long)]
        palette: Option<PalettePreset>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which colour each label gets.
    Legend {
        #[arg(default_value = "-")]
        input: String,

        #[arg(short, long)]
        palette: Option<PalettePreset>,

        #[arg(long)]
        json: bool,
    },

    /// Look up statement definitions the way tooltips show them.
    Defs {
        #[arg(default_value = "-")]
        input: String,

        /// Node id to look up
        #[arg(long, conflicts_with = "edge")]
        node: Option<String>,

        /// Edge title to look up (e.g. "a->b" or "a-label-b")
        #[arg(long)]
        edge: Option<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Dump the statement blocks and parser warnings as JSON.
    Blocks {
        #[arg(default_value = "-")]
        input: String,

        /// Only print counts and warnings
        #[arg(long)]
        summary: bool,

        #[arg(long)]
        pretty: bool,
    },

    /// Check that the input is loadable and report diagnostics.
    Validate {
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with non-zero status on warnings (not just errors)
        #[arg(long)]
        strict: bool,
    },

    /// Filter, optionally colour, and render to SVG with Graphviz.
    Render {
        #[arg(default_value = "-")]
        input: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Layout engine (dot, neato, fdp, circo, twopi). Overrides the config file.
        #[arg(short, long)]
        engine: Option<LayoutEngine>,

        /// Colour edges by label before rendering
        #[arg(long)]
        color: bool,

        #[arg(short, long)]
        palette: Option<PalettePreset>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, Args)]
struct SelectionArgs {
    /// Keep edges with this label (repeatable; "all" keeps everything)
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// Keep edges without a label attribute
    #[arg(long)]
    no_label: bool,
}

impl SelectionArgs {
    fn selection(&self) -> EdgeSelection {
        let mut values = self.labels.clone();
        if self.no_label {
            values.push(NO_LABEL_SENTINEL.to_string());
        }
        EdgeSelection::from_values(values)
    }
}

/// Result of validating a document.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    bytes: usize,
    lines: usize,
    looks_like_dot: bool,
    stats: DocumentStats,
    label_count: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Labels { input, json } => cmd_labels(&input, &config, json),

        Command::Filter {
            input,
            selection,
            output,
        } => cmd_filter(&input, &config, &selection, output.as_deref()),

        Command::Color {
            input,
            selection,
            palette,
            output,
        } => cmd_color(
            &input,
            &config,
            &selection,
            palette.unwrap_or(config.palette),
            output.as_deref(),
        ),

        Command::Legend {
            input,
            palette,
            json,
        } => cmd_legend(&input, &config, palette.unwrap_or(config.palette), json),

        Command::Defs {
            input,
            node,
            edge,
            pretty,
        } => cmd_defs(&input, &config, node.as_deref(), edge.as_deref(), pretty),

        Command::Blocks {
            input,
            summary,
            pretty,
        } => cmd_blocks(&input, &config, summary, pretty),

        Command::Validate {
            input,
            json,
            strict,
        } => cmd_validate(&input, &config, json, strict),

        Command::Render {
            input,
            selection,
            engine,
            color,
            palette,
            output,
        } => cmd_render(
            &input,
            &config,
            &selection,
            engine.unwrap_or(config.layout),
            color.then(|| palette.unwrap_or(config.palette)),
            output.as_deref(),
        ),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .try_init();
}

/// Loads and checks the input, logging loader and parser warnings.
fn load(input: &str, config: &DotlensConfig) -> Result<Source> {
    let (source, report) = load_checked(input, config)?;
    for message in input_warnings(&report, &source.text) {
        warn!("{message}");
    }
    debug!(bytes = report.bytes, lines = report.lines, "input loaded");
    Ok(source)
}

fn input_warnings(report: &SourceReport, text: &str) -> Vec<String> {
    let mut warnings = report.warnings.clone();
    warnings.extend(parse_document(text).warnings);
    warnings
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: labels
// =============================================================================

fn cmd_labels(input: &str, config: &DotlensConfig, json: bool) -> Result<()> {
    let source = load(input, config)?;
    let labels = extract_labels(&source.text);
    info!(count = labels.len(), "labels extracted");

    if json {
        return print_json(&labels, false);
    }
    for label in labels.sorted() {
        println!("{label}");
    }
    Ok(())
}

// =============================================================================
// Command: filter / color
// =============================================================================

fn cmd_filter(
    input: &str,
    config: &DotlensConfig,
    selection: &SelectionArgs,
    output: Option<&Path>,
) -> Result<()> {
    let source = load(input, config)?;
    let outcome = filter_with_counts(&source.text, &selection.selection());
    info!(
        kept = outcome.edges_kept,
        removed = outcome.edges_removed,
        "filtered edges"
    );
    write_output(output, &outcome.text)
}

fn cmd_color(
    input: &str,
    config: &DotlensConfig,
    selection: &SelectionArgs,
    palette: PalettePreset,
    output: Option<&Path>,
) -> Result<()> {
    let source = load(input, config)?;
    let prepared = prepare(&source.text, &selection.selection(), Some(palette));
    info!(
        palette = palette.as_str(),
        labels = prepared.legend.len(),
        "coloured edges"
    );
    write_output(output, &prepared.text)
}

// =============================================================================
// Command: legend
// =============================================================================

fn cmd_legend(
    input: &str,
    config: &DotlensConfig,
    palette: PalettePreset,
    json: bool,
) -> Result<()> {
    let source = load(input, config)?;
    let legend = prepare(&source.text, &EdgeSelection::All, Some(palette)).legend;

    if json {
        return print_json(&legend, false);
    }
    for entry in &legend {
        println!("{}  {}", entry.color, entry.display);
    }
    Ok(())
}

// =============================================================================
// Command: defs
// =============================================================================

fn cmd_defs(
    input: &str,
    config: &DotlensConfig,
    node: Option<&str>,
    edge: Option<&str>,
    pretty: bool,
) -> Result<()> {
    let source = load(input, config)?;
    let registry = DefinitionRegistry::build(&source.text);

    let (kind, title, found) = match (node, edge) {
        (Some(title), _) => ("node", title, registry.find_node(title)),
        (None, Some(title)) => ("edge", title, registry.find_edge(title)),
        (None, None) => return print_json(&registry, pretty),
    };

    match found {
        Some(definition) => {
            println!("{definition}");
            Ok(())
        }
        None => {
            eprintln!("No {kind} definition found for '{title}'");
            std::process::exit(1);
        }
    }
}

// =============================================================================
// Command: blocks
// =============================================================================

fn cmd_blocks(input: &str, config: &DotlensConfig, summary: bool, pretty: bool) -> Result<()> {
    let source = load(input, config)?;
    let parsed = parse_document(&source.text);

    if summary {
        println!("{}", dl_parser::parse_summary_json(&parsed));
        return Ok(());
    }
    print_json(&parsed, pretty)
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, config: &DotlensConfig, json_output: bool, strict: bool) -> Result<()> {
    let source = dl_cli::load_source(input)?;
    let result = validate_document(&source, config, strict);

    if json_output {
        print_json(&result, true)?;
    } else {
        if result.valid {
            println!("✓ Valid DOT input");
        } else {
            println!("✗ Invalid DOT input");
        }

        println!("  Bytes: {}", result.bytes);
        println!("  Lines: {}", result.lines);
        println!(
            "  Blocks: {} node, {} edge, {} other",
            result.stats.node_blocks, result.stats.edge_blocks, result.stats.other_blocks
        );
        println!("  Labels: {}", result.label_count);

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for err in &result.errors {
                println!("  {err}");
            }
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                println!("  {warning}");
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn validate_document(source: &Source, config: &DotlensConfig, strict: bool) -> ValidateResult {
    let report = match validate_source(source.name.as_deref(), &source.text, config) {
        Ok(report) => report,
        Err(err) => {
            return ValidateResult {
                valid: false,
                bytes: source.text.len(),
                lines: source.text.lines().count(),
                looks_like_dot: false,
                stats: DocumentStats::default(),
                label_count: 0,
                errors: vec![err.to_string()],
                warnings: Vec::new(),
            };
        }
    };

    let parsed = parse_document(&source.text);
    let SourceReport {
        bytes,
        lines,
        looks_like_dot,
        mut warnings,
    } = report;
    warnings.extend(parsed.warnings.iter().cloned());

    ValidateResult {
        valid: !strict || warnings.is_empty(),
        bytes,
        lines,
        looks_like_dot,
        stats: parsed.stats(),
        label_count: extract_labels(&source.text).len(),
        errors: Vec::new(),
        warnings,
    }
}

// =============================================================================
// Command: render
// =============================================================================

fn cmd_render(
    input: &str,
    config: &DotlensConfig,
    selection: &SelectionArgs,
    engine: LayoutEngine,
    coloring: Option<PalettePreset>,
    output: Option<&Path>,
) -> Result<()> {
    let source = load(input, config)?;
    let prepared = prepare(&source.text, &selection.selection(), coloring);
    let renderer = GraphvizCommand::from_config(config);
    info!(
        %engine,
        binary = %renderer.binary().display(),
        kept = prepared.edges_kept,
        removed = prepared.edges_removed,
        "rendering"
    );

    let svg = renderer
        .render(&prepared.text, engine)
        .context("Graphviz rendering failed")?;
    write_output(output, &svg)
}
