//! Integration tests for the dotlens pipeline and binary.
//!
//! Library tests go from file loading through filtering and colouring; the
//! binary tests run `dotlens` against temp files with an explicit config so
//! no user configuration leaks in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use dl_cli::{GraphvizCommand, load_checked, parse_config, resolve_config};
use dl_core::{DotlensConfig, EdgeSelection, GraphRenderer, LabelKey, LayoutEngine, PalettePreset};
use dl_parser::{DefinitionRegistry, parse_document};
use dl_transform::{extract_labels, prepare};
use tempfile::TempDir;

const DEPS: &str = "digraph deps {
  rankdir=LR;
  app [shape=box];
  app -> core [label=\"uses\"];
  app -> log [
    label=\"writes\",
    style=dashed
  ];
  core -> log;
}
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("dotlens.toml"), "palette = \"default\"\n").expect("config");
        Self { dir }
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("dotlens.toml")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_dotlens"))
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("run dotlens")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn file_pipeline_filters_then_colours() {
    let fixture = Fixture::new();
    let path = fixture.file("deps.dot", DEPS);
    let (source, report) = load_checked(&path_arg(&path), &DotlensConfig::default()).expect("load");
    assert!(report.looks_like_dot);
    assert!(report.warnings.is_empty());

    let prepared = prepare(
        &source.text,
        &EdgeSelection::from_values(["writes"]),
        Some(PalettePreset::Default),
    );
    assert_eq!(
        prepared.text,
        "digraph deps {
  rankdir=LR;
  app [shape=box];
  app -> log [
    label=\"writes\",
    style=dashed, color=\"#FF6B6B\"
  ];
}
"
    );
    assert_eq!((prepared.edges_kept, prepared.edges_removed), (1, 2));
}

#[test]
fn parsed_blocks_match_the_statements() {
    let parsed = parse_document(DEPS);
    let stats = parsed.stats();
    assert_eq!(stats.edge_blocks, 3);
    assert_eq!(stats.node_blocks, 1);
    assert_eq!(stats.multi_line_blocks, 1);
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);

    let multi = parsed
        .edges()
        .find(|block| block.line_count() > 1)
        .expect("multi-line edge");
    assert_eq!((multi.start_line(), multi.end_line()), (4, 7));
}

#[test]
fn tooltip_lookups_resolve_renderer_titles() {
    let registry = DefinitionRegistry::build(DEPS);
    assert_eq!(registry.find_node("app"), Some("app [shape=box]"));
    assert_eq!(
        registry.find_edge("app&#45;&gt;log"),
        Some("app -> log [\nlabel=\"writes\",\nstyle=dashed\n]")
    );
    assert_eq!(registry.find_edge("app-uses-core"), Some("app -> core [label=\"uses\"]"));
    assert_eq!(registry.find_edge("core -- log"), Some("core -> log"));
}

#[test]
fn labels_include_the_no_label_sentinel() {
    let labels = extract_labels(DEPS);
    assert_eq!(
        labels.sorted(),
        vec![LabelKey::NoLabel, LabelKey::from("uses"), LabelKey::from("writes")]
    );
}

#[test]
fn config_search_prefers_the_local_file() {
    let fixture = Fixture::new();
    fs::write(fixture.config_path(), "layout = \"twopi\"\ngraphviz_binary = \"/opt/gv/dot\"\n")
        .expect("config");
    let config = resolve_config(None, fixture.dir.path(), None).expect("config");
    assert_eq!(config.layout, LayoutEngine::Twopi);
    assert_eq!(
        GraphvizCommand::from_config(&config).binary(),
        Path::new("/opt/gv/dot")
    );
}

#[test]
fn size_limit_from_config_is_enforced() {
    let config = parse_config("max_input_bytes = 16").expect("config");
    let fixture = Fixture::new();
    let path = fixture.file("big.gv", DEPS);
    let err = load_checked(&path_arg(&path), &config).expect_err("too large");
    assert!(format!("{err:#}").contains("exceeds the 16 byte limit"));
}

#[test]
fn renderer_failure_is_reported_not_panicked() {
    let renderer = GraphvizCommand::new("/nonexistent/dot");
    let err = renderer.render(DEPS, LayoutEngine::Fdp).expect_err("no binary");
    assert!(err.to_string().starts_with("fdp render failed"));
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn labels_command_lists_sorted_labels() {
    let fixture = Fixture::new();
    let path = fixture.file("deps.dot", DEPS);
    let output = fixture.run(&["labels", &path_arg(&path)]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "__no_label__\nuses\nwrites\n");
}

#[test]
fn filter_command_writes_the_filtered_document() {
    let fixture = Fixture::new();
    let path = fixture.file("deps.dot", DEPS);
    let out_path = fixture.dir.path().join("out.dot");
    let output = fixture.run(&[
        "filter",
        &path_arg(&path),
        "--label",
        "uses",
        "--output",
        &path_arg(&out_path),
    ]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(out_path).expect("output file"),
        "digraph deps {
  rankdir=LR;
  app [shape=box];
  app -> core [label=\"uses\"];
}
"
    );
}

#[test]
fn color_command_accepts_inline_text() {
    let fixture = Fixture::new();
    let output = fixture.run(&["color", "digraph { a -> b; b -> c [label=k]; }", "-p", "muted"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "digraph { a -> b [color=\"#CC6677\"]; b -> c [label=k, color=\"#332288\"]; }"
    );
}

#[test]
fn legend_command_emits_json() {
    let fixture = Fixture::new();
    let path = fixture.file("deps.gv", DEPS);
    let output = fixture.run(&["legend", &path_arg(&path), "--json"]);
    assert!(output.status.success());
    let legend: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(legend[0]["key"], "__no_label__");
    assert_eq!(legend[0]["display"], "No label");
    assert_eq!(legend[2]["key"], "writes");
}

#[test]
fn defs_command_reports_missing_definitions() {
    let fixture = Fixture::new();
    let path = fixture.file("deps.dot", DEPS);
    let found = fixture.run(&["defs", &path_arg(&path), "--edge", "app->core"]);
    assert!(found.status.success());
    assert_eq!(stdout(&found), "app -> core [label=\"uses\"]\n");

    let missing = fixture.run(&["defs", &path_arg(&path), "--node", "nope"]);
    assert!(!missing.status.success());
}

#[test]
fn validate_command_rejects_unsupported_extensions() {
    let fixture = Fixture::new();
    let path = fixture.file("deps.txt", DEPS);
    let output = fixture.run(&["validate", &path_arg(&path), "--json"]);
    assert!(!output.status.success());
    let result: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json");
    assert_eq!(result["valid"], false);
    assert!(
        result["errors"][0]
            .as_str()
            .is_some_and(|message| message.contains("unsupported file extension"))
    );
}

#[test]
fn bad_config_file_fails_fast() {
    let fixture = Fixture::new();
    fs::write(fixture.config_path(), "layout = 3").expect("config");
    let output = fixture.run(&["labels", "digraph { a -> b }"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"), "{stderr}");
}
