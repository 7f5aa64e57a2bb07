//! End-to-end CLI tests using `assert_cmd`
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::tests_outside_test_module,
        reason = "Test allows"
    )
)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get cargo binary or fail test
fn cargo_bin() -> Command {
    Command::cargo_bin("crewcheck").unwrap_or_else(|err| panic!("Binary not found: {err}"))
}

/// Helper to create temp dir or fail test
fn temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|err| panic!("Failed to create temp dir: {err}"))
}

/// Bundled fixture suite by name
fn fixtures(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command running from an empty working directory so no stray
/// `crewcheck.toml` is picked up
fn isolated(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin();
    cmd.current_dir(temp.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    cargo_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--test-dir"));
}

#[test]
fn test_cli_rejects_verbosity_out_of_range() {
    let temp = temp_dir();
    isolated(&temp).args(["-v", "3"]).assert().failure();
}

#[test]
fn test_cli_missing_test_dir_is_not_an_error() {
    let temp = temp_dir();

    isolated(&temp)
        .args(["--test-dir", "does-not-exist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"))
        .stdout(predicate::str::contains("test_*.json"));
}

#[test]
fn test_cli_empty_directory() {
    let temp = temp_dir();
    fs::create_dir(temp.path().join("tests"))
        .unwrap_or_else(|err| panic!("Failed to create tests dir: {err}"));

    isolated(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tests found"));
}

#[test]
fn test_cli_passing_suite() {
    let temp = temp_dir();

    isolated(&temp)
        .arg("--test-dir")
        .arg(fixtures("passing"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 4 test(s)"))
        .stdout(predicate::str::contains("CREW TEST SUMMARY"))
        .stdout(predicate::str::contains("Success Rate: 100.0%"))
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_cli_failing_suite_exits_with_one() {
    let temp = temp_dir();

    isolated(&temp)
        .arg("--test-dir")
        .arg(fixtures("failing"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Found 3 test(s)"))
        .stdout(predicate::str::contains("Writer must answer with JSON"))
        .stdout(predicate::str::contains("FAILED"));
}

#[test]
fn test_cli_pattern_filters_modules() {
    let temp = temp_dir();

    isolated(&temp)
        .arg("--test-dir")
        .arg(fixtures("passing"))
        .args(["--pattern", "test_pipeline.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 test(s)"));
}

#[test]
fn test_cli_writes_html_report() {
    let temp = temp_dir();
    let report = temp.path().join("report.html");

    isolated(&temp)
        .arg("--test-dir")
        .arg(fixtures("failing"))
        .arg("--report")
        .arg("--report-file")
        .arg(&report)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Report generated"));

    let html = fs::read_to_string(&report)
        .unwrap_or_else(|err| panic!("Failed to read report: {err}"));
    assert!(html.contains("WriterTests.test_json_output"));
}

#[test]
fn test_cli_reads_config_file() {
    let temp = temp_dir();
    let config = temp.path().join("crewcheck.toml");
    fs::write(
        &config,
        format!(
            "test_dir = {:?}\nverbosity = 0\n",
            fixtures("passing").display().to_string()
        ),
    )
    .unwrap_or_else(|err| panic!("Failed to write config: {err}"));

    isolated(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 4 test(s)"));
}

#[test]
fn test_cli_missing_explicit_config_fails() {
    let temp = temp_dir();

    isolated(&temp)
        .args(["--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
