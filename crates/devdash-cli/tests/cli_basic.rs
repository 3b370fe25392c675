//! Basic CLI E2E tests.
//!
//! Each test runs the `devdash` binary against its own temporary data
//! directory and a service address nothing listens on.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

const OFFLINE_URL: &str = "http://127.0.0.1:9";

fn devdash(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_devdash"));
    cmd.env("DEVDASH_DATA_DIR", data_dir)
        .env_remove("DEVDASH_TOKEN")
        .env_remove("DEVDASH_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = devdash(data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn offline_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "remote.base_url", OFFLINE_URL]);
    assert_eq!(code, 0, "config set failed: {stderr}");
    dir
}

#[test]
fn test_config_path_is_inside_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(&*dir.path().to_string_lossy()));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.work_minutes", "50"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.work_minutes"]);
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.work_minutes", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_show_is_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "show"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["stats"]["window_days"], 7);
}

#[test]
fn test_timer_status_defaults_to_idle_work() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["type"], "StateSnapshot");
    assert_eq!(parsed["status"], "idle");
    assert_eq!(parsed["phase"], "work");
    assert_eq!(parsed["remaining_secs"], 1500);
}

#[test]
fn test_timer_run_start_pause_quit_saves_paused_state() {
    let dir = offline_dir();
    let mut child = devdash(dir.path())
        .args(["timer", "run"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"s\np\nq\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let types: Vec<String> = stdout
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).unwrap();
            event["type"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(types, vec!["TimerStarted", "TimerPaused"]);

    let (stdout, _, _) = run_cli(dir.path(), &["timer", "status"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["status"], "paused");
}

#[test]
fn test_sync_status_empty_queue() {
    let dir = offline_dir();
    let (stdout, _, code) = run_cli(dir.path(), &["sync", "status"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["pending"], 0);
}

#[test]
fn test_sync_flush_with_nothing_pending() {
    let dir = offline_dir();
    let (stdout, _, code) = run_cli(dir.path(), &["sync", "flush"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["attempted"], 0);
}

#[test]
fn test_stats_unavailable_when_service_is_down() {
    let dir = offline_dir();
    let (stdout, _, code) = run_cli(dir.path(), &["stats", "daily"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("stats unavailable"));
}

#[test]
fn test_stats_days_out_of_range_is_rejected() {
    let dir = offline_dir();
    for days in ["0", "367", "4000000000"] {
        let (_, stderr, code) = run_cli(dir.path(), &["stats", "daily", "--days", days]);
        assert_eq!(code, 2, "--days {days} accepted");
        assert!(stderr.contains("--days"));
    }
}
