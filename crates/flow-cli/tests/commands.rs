//! Integration tests: CLI subcommands over files on disk (flow-cli ↔ flow-core).

use std::fs;
use std::path::PathBuf;

use flow_cli::{Args, CliError, Command, run};
use flow_core::{parse_document, sample_document};
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("flowchart-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "warn".into(),
    }
}

fn run_to_string(args: &Args) -> Result<String, CliError> {
    let mut out = Vec::new();
    run(args, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

// ─── Commands ────────────────────────────────────────────────────────────

#[test]
fn sample_then_check() {
    let path = scratch("sample.xml");
    run_to_string(&args(Command::Sample {
        output: Some(path.clone()),
    }))
    .unwrap();

    let report = run_to_string(&args(Command::Check { input: path.clone() })).unwrap();
    assert!(report.ends_with("ok (4 nodes, 4 edges, 0 groups)\n"), "{report}");
}

#[test]
fn fmt_is_stable() {
    let path = scratch("fmt.xml");
    fs::write(&path, flow_core::emit_document(&sample_document())).unwrap();

    let once = run_to_string(&args(Command::Fmt {
        input: path.clone(),
        output: None,
    }))
    .unwrap();
    fs::write(&path, &once).unwrap();
    let twice = run_to_string(&args(Command::Fmt {
        input: path,
        output: None,
    }))
    .unwrap();

    assert_eq!(once, twice);
    let doc = parse_document(&once).unwrap();
    assert_eq!(doc.nodes, sample_document().nodes);
}

#[test]
fn stats_json_reports_counts() {
    let path = scratch("stats.xml");
    fs::write(&path, flow_core::emit_document(&sample_document())).unwrap();
    let json = run_to_string(&args(Command::Stats {
        input: path,
        json: true,
    }))
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"], 4);
    assert_eq!(value["labelled_edges"], 2);
    assert_eq!(value["bounds"]["width"], 1080.0);
}

#[test]
fn dump_emits_document_json() {
    let path = scratch("dump.xml");
    fs::write(&path, flow_core::emit_document(&sample_document())).unwrap();
    let json = run_to_string(&args(Command::Dump { input: path })).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(4));
    assert_eq!(value["nodes"][0]["text"], "Start");
}

#[test]
fn dangling_reference_fails_check() {
    let path = scratch("dangling.xml");
    let xml = flow_core::emit_document(&sample_document()).replace("to=\"n4:left\"", "to=\"ghost:left\"");
    fs::write(&path, xml).unwrap();

    let err = run_to_string(&args(Command::Check { input: path })).unwrap_err();
    assert!(matches!(err, CliError::Import { .. }));
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn missing_input_names_the_path() {
    let err = run_to_string(&args(Command::Check {
        input: scratch("does-not-exist.xml"),
    }))
    .unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
    assert!(err.to_string().contains("does-not-exist.xml"));
}

#[test]
fn config_file_changes_import_floor() {
    let config = scratch("coarse.toml");
    fs::write(&config, "min_node_width = 200.0\n").unwrap();
    let path = scratch("coarse.xml");
    fs::write(&path, flow_core::emit_document(&sample_document())).unwrap();

    let mut a = args(Command::Dump { input: path });
    a.config = Some(config);
    let json = run_to_string(&a).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    // n1 is 180 wide, below the configured floor.
    assert_eq!(value["nodes"][0]["w"], 200.0);
}
