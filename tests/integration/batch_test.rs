//! Batch mode tests against the built binary.

use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

/// Runs icequery with the mock engine and an empty config.
/// Returns (exit code, stdout, stderr).
fn run_batch(args: &[&str]) -> (i32, String, String) {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("config.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_icequery"))
        .arg("--mock-engine")
        .arg("--config")
        .arg(&config)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (exit_code, stdout, stderr)
}

#[test]
fn test_execute_prints_table() {
    let (code, stdout, _) = run_batch(&[
        "-e",
        "SELECT * FROM iceberg_catalog.analytics.events LIMIT 3",
    ]);
    assert_eq!(code, 0);
    let mut lines = stdout.lines();
    let header = lines.next().unwrap_or_default();
    assert!(header.contains("id"));
    assert!(header.contains("event_type"));
    assert!(stdout.contains("3 rows in"));
}

#[test]
fn test_execute_json_contains_all_rows() {
    let (code, stdout, _) = run_batch(&[
        "-e",
        "SELECT * FROM iceberg_catalog.analytics.events",
        "--output",
        "json",
    ]);
    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["rowCount"], 120);
    assert_eq!(value["rows"].as_array().map(Vec::len), Some(120));
    assert_eq!(value["engine"], "mock");
}

#[test]
fn test_query_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "SELECT * FROM iceberg_catalog.analytics.events LIMIT 2;").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let (code, stdout, _) = run_batch(&["--file", &path]);
    assert_eq!(code, 0);
    assert!(stdout.contains("2 rows in"));
}

#[test]
fn test_engine_error_exits_non_zero() {
    let (code, stdout, stderr) = run_batch(&["-e", "SELEC 1"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("syntax error at or near"));
}
