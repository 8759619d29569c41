//! Integration tests for the Plotline CLI
//!
//! These tests run the actual binary with an isolated config directory and
//! the mock provider, so no API key or network is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Binary with HOME and XDG config pointed at an empty temp dir
fn plotline_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plotline").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_MODEL")
        .env_remove("OPENAI_BASE_URL")
        .env("RUST_LOG", "error");
    cmd
}

const TEXT_PIPELINE: &str = r#"
name: pitch
tasks:
  - id: logline
    prompt: "Logline for {{ args[0] }}"
  - id: pitch
    depends_on: [logline]
    prompt: "Pitch built on {{ parent_output }}"
"#;

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("schema"));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_default_pipeline_prints_order() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tasks: 4"))
        .stdout(predicate::str::contains("Terminal: scene_shaper"))
        .stdout(predicate::str::contains("1. plot_architect"))
        .stdout(predicate::str::contains("4. scene_shaper ← thematic_analyst"));
}

#[test]
fn test_check_rejects_cycle() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("cycle.yaml");
    fs::write(
        &file,
        "tasks:\n  - id: a\n    depends_on: [b]\n    prompt: x\n  - id: b\n    depends_on: [a]\n    prompt: y\n",
    )
    .unwrap();

    plotline_cmd(&home)
        .args(["check", "--pipeline"])
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("PLOT-020"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_check_missing_file() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .args(["check", "--pipeline", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

// ============================================================================
// schema
// ============================================================================

#[test]
fn test_schema_prints_json_schema() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .args(["schema", "outline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"protagonist_need\""))
        .stdout(predicate::str::contains("\"required\""));
}

#[test]
fn test_schema_unknown_name() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .args(["schema", "haiku"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLOT-042"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_empty_premise() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .args(["run", "   ", "--provider", "mock"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("PLOT-001"));
}

#[test]
fn test_run_openai_without_key() {
    let home = TempDir::new().unwrap();
    plotline_cmd(&home)
        .args(["run", "A lighthouse", "--provider", "openai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLOT-031"));
}

#[test]
fn test_run_openai_shows_masked_key() {
    let home = TempDir::new().unwrap();
    // Nothing listens on the discard port, so the first call fails fast
    plotline_cmd(&home)
        .env("OPENAI_API_KEY", "sk-test-supersecret")
        .env("OPENAI_BASE_URL", "http://127.0.0.1:9/v1")
        .args(["run", "A lighthouse", "--provider", "openai"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("key: sk-tes***"))
        .stderr(predicate::str::contains("supersecret").not());
}

#[test]
fn test_run_custom_pipeline_with_mock() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("pitch.yaml");
    let output = home.path().join("out.json");
    let trace = home.path().join("trace.json");
    fs::write(&file, TEXT_PIPELINE).unwrap();

    plotline_cmd(&home)
        .args(["run", "A lighthouse", "--provider", "mock", "--pipeline"])
        .arg(&file)
        .arg("--output")
        .arg(&output)
        .arg("--trace")
        .arg(&trace)
        .assert()
        .success();

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(result["terminal"], "pitch");
    assert_eq!(result["output"], "Mock response");
    assert_eq!(result["context"]["inputs"]["args"][0], "A lighthouse");
    assert_eq!(result["context"]["tasks"][0]["task_id"], "logline");

    let events: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&trace).unwrap()).unwrap();
    assert_eq!(events[0]["kind"]["type"], "run_started");
}

#[test]
fn test_run_screenplay_fails_on_unstructured_mock_output() {
    let home = TempDir::new().unwrap();
    let trace = home.path().join("trace.json");

    plotline_cmd(&home)
        .args(["run", "A lighthouse", "--provider", "mock", "--trace"])
        .arg(&trace)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("PLOT-011"))
        .stderr(predicate::str::contains("plot_architect"))
        .stderr(predicate::str::contains("PLOT-061"));

    let trace = fs::read_to_string(&trace).unwrap();
    assert!(trace.contains("task_failed"));
    assert!(trace.contains("run_failed"));
}
