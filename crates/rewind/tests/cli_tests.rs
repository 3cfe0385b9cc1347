//! CLI integration tests.
//!
//! These tests run the rewind binary end-to-end against temporary projects.

use rewind_test_utils::assertions::{assert_file_contains, assert_file_equals};
use rewind_test_utils::{BuiltTestProject, TestProject};
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn rewind(project: &BuiltTestProject, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rewind"))
        .arg("--root")
        .arg(project.path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_version_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_rewind"))
        .arg("version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    assert!(stdout(&output).contains("rewind"));
}

#[test]
fn test_help_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_rewind"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Snapshot and restore project trees"));
    assert!(text.contains("restore"));
    assert!(text.contains("--root"));
}

#[test]
fn test_setup_creates_initial_checkpoint() {
    let project = TestProject::new().with_web_project().build();

    let output = rewind(&project, &["setup"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Initial checkpoint: initial_"));
    assert_file_contains(&project.path().join(".gitignore"), ".checkpoints/");
    assert!(project.checkpoint_dir().join("config.json").exists());
}

#[test]
fn test_create_and_list() {
    let project = TestProject::new().with_file("app.js", "1").build();

    let created = rewind(&project, &["create", "-d", "Before refactor"]);
    assert!(created.status.success(), "stderr: {}", stderr(&created));
    assert!(stdout(&created).contains("Checkpoint created: before_refactor_"));

    let listed = rewind(&project, &["list"]);
    assert!(listed.status.success());
    let text = stdout(&listed);
    assert!(text.contains("Available checkpoints (1)"));
    assert!(text.contains("Before refactor"));
    assert!(text.contains("1 files"));
}

#[test]
fn test_list_without_checkpoints() {
    let project = TestProject::new().build();

    let output = rewind(&project, &["list"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("No checkpoints found"));
}

#[test]
fn test_create_in_empty_project_fails() {
    let project = TestProject::new().build();

    let output = rewind(&project, &["create"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No files found to checkpoint"));
}

#[test]
fn test_restore_round_trip() {
    let project = TestProject::new()
        .with_file("src/main.js", "v1")
        .with_file("README.md", "readme")
        .build();
    assert!(rewind(&project, &["create", "-n", "base"]).status.success());

    project.write_file("src/main.js", "v2");
    project.write_file("src/extra.js", "new");

    let preview = rewind(&project, &["restore", "base", "--dry-run"]);
    assert!(preview.status.success());
    assert!(stdout(&preview).contains("Dry run: would restore base_"));
    assert!(stdout(&preview).contains("src/extra.js"));
    assert_file_equals(&project.path().join("src/main.js"), "v2");

    let restored = rewind(&project, &["restore", "base"]);
    assert!(restored.status.success(), "stderr: {}", stderr(&restored));
    assert!(stdout(&restored).contains("Emergency backup: emergency_backup_"));
    assert_file_equals(&project.path().join("src/main.js"), "v1");
    assert_eq!(project.tree(), vec!["README.md", "src/main.js"]);
}

#[test]
fn test_restore_unknown_checkpoint_lists_candidates() {
    let project = TestProject::new().with_file("app.js", "1").build();
    assert!(rewind(&project, &["create", "-n", "base"]).status.success());

    let output = rewind(&project, &["restore", "nope"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Checkpoint not found: nope"));
    assert!(err.contains("- base_"));
}

#[test]
fn test_log_and_changelog() {
    let project = TestProject::new().build();

    let logged = rewind(
        &project,
        &["log", "Fixed login", "--details", "Null check", "--action", "BUG_FIX"],
    );
    assert!(logged.status.success(), "stderr: {}", stderr(&logged));
    assert!(stdout(&logged).contains("Changelog entry added: Fixed login"));

    let history = rewind(&project, &["changelog"]);
    assert!(history.status.success());
    let text = stdout(&history);
    assert!(text.contains("1. BUG_FIX - "));
    assert!(text.contains("Fixed login"));
    assert!(text.contains("Null check"));
}

#[test]
fn test_serve_answers_on_stdout() {
    let project = TestProject::new().with_file("app.js", "1").build();

    let mut child = Command::new(env!("CARGO_BIN_EXE_rewind"))
        .arg("--root")
        .arg(project.path())
        .arg("serve")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn server");

    {
        let mut stdin = child.stdin.take().expect("stdin");
        writeln!(
            stdin,
            r#"{{"jsonrpc":"2.0","id":1,"method":"initialize","params":{{}}}}"#
        )
        .unwrap();
        writeln!(
            stdin,
            r#"{{"jsonrpc":"2.0","method":"notifications/initialized"}}"#
        )
        .unwrap();
        writeln!(stdin, r#"{{"jsonrpc":"2.0","id":2,"method":"tools/list"}}"#).unwrap();
        writeln!(stdin, r#"{{"jsonrpc":"2.0","id":3,"method":"nope"}}"#).unwrap();
    }

    let output = child.wait_with_output().expect("Failed to wait for server");
    assert!(output.status.success());

    let responses: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout must be JSON-RPC only"))
        .collect();
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "rewind");
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 6);
    assert_eq!(responses[2]["error"]["code"], -32601);
}
