//! Smoke tests for the vibeflow binary
//!
//! Each test runs the real binary in a temporary project directory with its
//! own workflow store, so nothing leaks between tests or into the user's
//! data directory.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn vibeflow_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_vibeflow"))
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    let store = dir.join("store").join("workflows.json");
    Command::new(vibeflow_bin())
        .current_dir(dir)
        .env_remove("VIBEFLOW_HOME")
        .env_remove("RUST_LOG")
        .arg("--store")
        .arg(&store)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(vibeflow_bin()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["status", "open", "reconcile", "sync", "prompt", "extract"] {
        assert!(text.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_open_complete_and_push() {
    let project = TempDir::new().unwrap();
    let dir = project.path();

    assert!(run_in(dir, &["open", "demo"]).status.success());
    assert!(run_in(dir, &["start", "discovery"]).status.success());
    assert!(
        run_in(dir, &["complete", "discovery", "--artifact", "DISCOVERY.xml"])
            .status
            .success()
    );
    assert!(run_in(dir, &["sync", "push"]).status.success());

    let text = fs::read_to_string(dir.join(".genius").join("STATE.json")).unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["phase"], "MARKET_ANALYSIS");
    assert_eq!(doc["checkpoints"]["discovery_complete"], true);

    let status = run_in(dir, &["status", "--json"]);
    assert!(status.status.success());
    let json: Value = serde_json::from_str(&stdout(&status)).unwrap();
    assert_eq!(json["projectId"], "demo");
    assert_eq!(json["currentPhase"], "market-analysis");
    assert_eq!(json["currentSubPhase"], "market-size");
}

#[test]
fn test_open_with_reconcile_reads_artifacts() {
    let project = TempDir::new().unwrap();
    let dir = project.path();
    fs::write(dir.join("DISCOVERY.xml"), "<discovery/>").unwrap();
    fs::write(dir.join("SPECIFICATIONS.xml"), "<specs/>").unwrap();

    assert!(run_in(dir, &["open", "demo", "--reconcile"]).status.success());
    let status = run_in(dir, &["status", "--json"]);
    let json: Value = serde_json::from_str(&stdout(&status)).unwrap();
    assert_eq!(json["currentPhase"], "design");
}

#[test]
fn test_prompt_appends_format_suffix() {
    let project = TempDir::new().unwrap();
    let output = run_in(
        project.path(),
        &["prompt", "--step", "target-users", "Who is this for?"],
    );
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Who is this for?"));
    assert!(text.contains("targetUsers"));
}

#[test]
fn test_extract_reads_reply_file() {
    let project = TempDir::new().unwrap();
    let dir = project.path();
    let reply = dir.join("reply.txt");
    fs::write(
        &reply,
        "Love it! <answer field=\"projectIdea\">Todo app for students</answer>",
    )
    .unwrap();

    assert!(run_in(dir, &["open", "demo"]).status.success());
    assert!(run_in(dir, &["start", "discovery"]).status.success());
    let output = run_in(
        dir,
        &["extract", "--json", "--response", reply.to_str().unwrap()],
    );
    assert!(output.status.success());
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["source"], "discovery:project-idea");
    assert_eq!(json["advancedTo"], "target-users");
}

#[test]
fn test_unknown_phase_exits_with_usage_code() {
    let project = TempDir::new().unwrap();
    let output = run_in(project.path(), &["start", "launch"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("launch"));
}

#[test]
fn test_strict_transitions_refuse_regression() {
    let project = TempDir::new().unwrap();
    let dir = project.path();
    assert!(run_in(dir, &["open", "demo"]).status.success());
    assert!(run_in(dir, &["complete", "discovery"]).status.success());
    let output = run_in(
        dir,
        &["--strict-transitions", "set-status", "discovery", "pending"],
    );
    assert!(!output.status.success());
    assert!(run_in(dir, &["set-status", "discovery", "pending"]).status.success());
}
