//! CLI config and session tests.
//!
//! Tests invoke the built binary and verify outputs.

use std::io::Write;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pomonote"))
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get_default() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let (out, _, code) = run_cli(&["config", "get", "timer.pomo", "--file", file.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(out.trim(), "25");
    assert!(file.exists(), "defaults should be written on first load");
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let path = file.to_str().unwrap();

    let (_, _, code) = run_cli(&["config", "set", "timer.short_break", "7", "--file", path]);
    assert_eq!(code, 0);
    let (out, _, _) = run_cli(&["config", "get", "timer.short_break", "--file", path]);
    assert_eq!(out.trim(), "7");
}

#[test]
fn test_config_rejects_bad_value() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let path = file.to_str().unwrap();

    let (_, err, code) = run_cli(&["config", "set", "timer.pomo", "0", "--file", path]);
    assert_eq!(code, 1);
    assert!(err.contains("error:"));
    let (out, _, _) = run_cli(&["config", "get", "timer.pomo", "--file", path]);
    assert_eq!(out.trim(), "25");
}

#[test]
fn test_config_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let (_, _, code) = run_cli(&["config", "get", "timer.nope", "--file", file.to_str().unwrap()]);
    assert_eq!(code, 1);
}

#[test]
fn test_run_session_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let vault = dir.path().join("vault");
    std::fs::create_dir_all(&vault).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_pomonote"))
        .args(["run", "--json", "--config", file.to_str().unwrap()])
        .arg("--vault")
        .arg(&vault)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start session");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"start\npause\nquit\nexit\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"type\":\"timer_started\""));
    assert!(stdout.contains("\"type\":\"timer_paused\""));
    assert!(stdout.contains("\"type\":\"timer_quit\""));
}
