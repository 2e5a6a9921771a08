#[path = "../../chess-lattice/tests/common/mod.rs"]
mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_lines(dir: &Path, lines: &[chess_lattice::Line]) -> std::path::PathBuf {
    let path = dir.join("lines.json");
    fs::write(&path, serde_json::to_string(lines).unwrap()).unwrap();
    path
}

fn cli() -> Command {
    Command::cargo_bin("chess-lattice").unwrap()
}

#[test]
fn reconstruct_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let lines = write_lines(dir.path(), &common::board_lines());
    let out = dir.path().join("report.json");

    cli()
        .args(["reconstruct", "--width", "1000", "--height", "1000", "--lines"])
        .arg(&lines)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(serde_json::Value::Bool(true), report["complete"]);
    assert_eq!(9, report["rows"].as_array().unwrap().len());
    assert_eq!(9, report["diagnostics"]["oriented"]["vertical"].as_array().unwrap().len());
}

#[test]
fn reconstruct_prints_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let lines = write_lines(dir.path(), &common::board_lines());

    cli()
        .args(["reconstruct", "--width", "1000", "--height", "1000", "--lines"])
        .arg(&lines)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"complete\": true"));
}

#[test]
fn incomplete_board_fails_unless_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let lines = write_lines(dir.path(), &common::board_lines_without(&[3, 6]));

    cli()
        .args(["reconstruct", "--width", "1000", "--height", "1000", "--lines"])
        .arg(&lines)
        .assert()
        .failure()
        .stderr(predicate::str::contains("lattice stage failed"));

    cli()
        .args(["reconstruct", "--width", "1000", "--height", "1000", "--allow-incomplete", "--lines"])
        .arg(&lines)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"complete\": false"));
}

#[test]
fn locate_prints_cell() {
    let dir = tempfile::tempdir().unwrap();
    let lines = write_lines(dir.path(), &common::board_lines());

    cli()
        .args(["locate", "--width", "1000", "--height", "1000", "--x", "420", "--y", "770", "--lines"])
        .arg(&lines)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fallback\": false"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let lines = write_lines(dir.path(), &common::board_lines_without(&[3, 6]));
    let config = dir.path().join("params.json");
    fs::write(&config, r#"{ "require_complete": false }"#).unwrap();

    cli()
        .args(["reconstruct", "--width", "1000", "--height", "1000", "--config"])
        .arg(&config)
        .arg("--lines")
        .arg(&lines)
        .assert()
        .success();
}

#[test]
fn missing_input_file_is_an_error() {
    cli()
        .args(["reconstruct", "--width", "10", "--height", "10", "--lines", "/nonexistent/lines.json"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}
