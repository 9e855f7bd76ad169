//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated HOME and verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli_in(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_safeyatra-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("SAFEYATRA_ENV")
        .env("SAFEYATRA_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let home = tempfile::tempdir().unwrap();
    run_cli_in(home.path(), args)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect()
}

#[test]
fn test_checkin_confirmed() {
    let (code, stdout, _) = run_cli(&[
        "checkin", "run", "--window", "5", "--respond", "safe", "--respond-after", "1",
        "--tick-ms", "100", "--tourist", "TOUR-4242",
    ]);
    assert_eq!(code, 0, "checkin run failed");
    let events = json_lines(&stdout);
    let types: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert!(types.contains(&"CheckInStarted"));
    assert!(types.contains(&"SafetyConfirmed"));
    assert!(!types.contains(&"EmergencyRaised"));

    let last = events.last().unwrap();
    assert_eq!(last["type"], "StateSnapshot");
    assert_eq!(last["state"], "confirmed");
    assert_eq!(last["subject_id"], "TOUR-4242");
}

#[test]
fn test_checkin_unanswered_escalates() {
    let (code, stdout, _) = run_cli(&[
        "checkin", "run", "--window", "2", "--respond", "none", "--tick-ms", "100",
    ]);
    assert_eq!(code, 0, "checkin run failed");
    let events = json_lines(&stdout);
    let escalated = events
        .iter()
        .find(|e| e["type"] == "CheckInEscalated")
        .expect("escalation event");
    assert_eq!(escalated["trigger"], "timeout");
    assert_eq!(
        events.iter().filter(|e| e["type"] == "EmergencyRaised").count(),
        1
    );
    assert_eq!(events.last().unwrap()["state"], "escalated");
}

#[test]
fn test_checkin_help() {
    let (code, stdout, _) = run_cli(&[
        "checkin", "run", "--window", "30", "--respond", "help", "--respond-after", "0",
        "--tick-ms", "100",
    ]);
    assert_eq!(code, 0);
    let events = json_lines(&stdout);
    let escalated = events
        .iter()
        .find(|e| e["type"] == "CheckInEscalated")
        .expect("escalation event");
    assert_eq!(escalated["trigger"], "help_requested");
}

#[test]
fn test_checkin_policy() {
    let (code, stdout, _) = run_cli(&["checkin", "policy"]);
    assert_eq!(code, 0);
    let policy: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(policy["response_window_secs"], 300);
    assert_eq!(policy["period_secs"], 600);
}

#[test]
fn test_panic_requires_confirmation() {
    let (code, _, stderr) = run_cli(&["panic"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("--yes"));

    let (code, stdout, _) = run_cli(&["panic", "--yes"]);
    assert_eq!(code, 0);
    let emergency: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(emergency["trigger"], "panic");
    assert_eq!(emergency["profile"]["blood_group"], "B+");
}

#[test]
fn test_sos_dry_run() {
    let (code, stdout, _) = run_cli(&["sos", "--dry-run"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "tel:100");

    let (code, _, _) = run_cli(&["sos", "--dry-run", "--number", "not-a-number"]);
    assert_ne!(code, 0);
}

#[test]
fn test_register_with_region() {
    let (code, stdout, _) = run_cli(&[
        "register", "--name", "Asha Rao", "--email", "asha@example.com", "--phone", "+91-1",
        "--nationality", "Indian", "--region", "Mumbai", "--blood-group", "O+",
        "--contact-name", "Ravi", "--contact-phone", "+91-2", "--id-type", "Passport",
        "--id-number", "Z1",
    ]);
    assert_eq!(code, 0);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(out["profile"]["tourist_id"].as_str().unwrap().starts_with("TOUR-"));
    assert_eq!(out["profile"]["location"]["name"], "Mumbai");
    assert_eq!(out["briefing"]["alerts"][0], "High tide warning at beaches");
}

#[test]
fn test_register_missing_location() {
    let (code, _, stderr) = run_cli(&[
        "register", "--name", "A", "--email", "a@b", "--phone", "1", "--nationality", "X",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Location access or a travel region is required"));
}

#[test]
fn test_directory_and_news() {
    let (code, stdout, _) = run_cli(&["directory", "facilities", "--kind", "police"]);
    assert_eq!(code, 0);
    let facilities: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(facilities.len(), 3);
    assert_eq!(facilities[0]["call"], "tel:+91-11-2334-5678");

    let (code, stdout, _) = run_cli(&["news", "--severity", "medium"]);
    assert_eq!(code, 0);
    let news: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(news.len(), 2);

    let (code, _, _) = run_cli(&["news", "--category", "sports"]);
    assert_ne!(code, 0);
}

#[test]
fn test_chat() {
    let (code, _, stderr) = run_cli(&["chat", "-m", "hello"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Please select a police station first"));

    let (code, stdout, _) = run_cli(&["chat", "--station", "ps1", "-m", "hello", "--quick", "2"]);
    assert_eq!(code, 0);
    let chat: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let messages = chat["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[3]["text"], "Lost passport/documents");
}

#[test]
fn test_authority_summary() {
    let (code, stdout, _) = run_cli(&["authority", "summary"]);
    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["tourists"], 4);
    assert_eq!(summary["low_battery_devices"], 2);
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli_in(home.path(), &["config", "get", "checkin.period_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "600");

    let (code, _, _) = run_cli_in(home.path(), &["config", "set", "emergency.sos_number", "112"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli_in(home.path(), &["sos", "--dry-run"]);
    assert_eq!(stdout.trim(), "tel:112");

    let (code, _, _) = run_cli_in(home.path(), &["config", "set", "checkin.response_window_secs", "0"]);
    assert_ne!(code, 0);
    let (code, _, _) = run_cli_in(home.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);

    let (code, stdout, _) = run_cli_in(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("emergency.sos_number = 112"));
}
