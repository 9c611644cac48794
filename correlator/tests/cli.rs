// Integration tests for the `hlsrc` binary.
//
// These tests lock the command-line contract:
// - `--emit tree` and `--emit build-info` need no selection
// - table/html/json output requires `--select` (exit 1 otherwise)
// - unreadable or malformed documents exit 2

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn hlsrc_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hlsrc"))
}

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

fn run(args: &[&str]) -> Output {
    Command::new(hlsrc_binary())
        .arg("--report-dir")
        .arg(project_root().join("demos/vector_add"))
        .args(args)
        .output()
        .expect("failed to run hlsrc")
}

#[test]
fn emit_tree_lists_nodes_without_selection() {
    let output = run(&["--emit", "tree"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Kernel: vector_add\n"));
    assert!(stdout.contains("\n  scale.B1 [block]\n"));
}

#[test]
fn emit_json_for_selection() {
    let output = run(&["--select", "Kernel: vector_add", "--emit", "json"]);
    assert!(output.status.success());
    let panel: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(panel["body"]["kind"], "table");
    let rows = panel["body"]["content"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1]["parentId"], rows[0]["id"]);
}

#[test]
fn emit_table_is_default() {
    let output = run(&["--select", "Kernel: scale"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("== Loop analysis: Kernel: scale ==\n"));
    assert!(stdout.contains("  scale.B1"));
}

#[test]
fn unknown_selection_prints_message() {
    let output = run(&["--select", "Kernel: missing"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No information found for this node"));
}

#[test]
fn table_without_selection_is_usage_error() {
    let output = run(&["--emit", "table"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--select"));
}

#[test]
fn missing_report_dir_exits_2() {
    let output = Command::new(hlsrc_binary())
        .arg("--report-dir")
        .arg(project_root().join("demos/no_such_report"))
        .arg("--emit")
        .arg("tree")
        .output()
        .expect("failed to run hlsrc");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn build_info_is_json() {
    let output = run(&["--emit", "build-info"]);
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["combined"].as_str().unwrap().len(), 64);
}

#[test]
fn verbose_prints_notes() {
    let output = run(&["--select", "Kernel: vector_add", "--verbose"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("note[N0301]: `vector_add.B9`"), "stderr: {stderr}");
    assert!(stderr.contains("flatten complete"));
}
