//! End-to-end checks against the built `esnn` binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_event_driven_run_completes() {
    let mut cmd = Command::cargo_bin("esnn").unwrap();
    cmd.args(["--mode", "event", "--t-max", "100"])
        .assert()
        .success()
        .stderr(predicate::str::contains("run complete"));
}

#[test]
fn test_clock_driven_run_completes() {
    let mut cmd = Command::cargo_bin("esnn").unwrap();
    cmd.args(["--mode", "clock", "--dt", "1.0", "--t-max", "50"])
        .assert()
        .success();
}

#[test]
fn test_save_json_writes_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.json");

    let mut cmd = Command::cargo_bin("esnn").unwrap();
    cmd.args(["--t-max", "10", "--save-json"])
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"version\""));
}

#[test]
fn test_dataset_flag_warns_but_still_runs() {
    let mut cmd = Command::cargo_bin("esnn").unwrap();
    cmd.args(["--dataset", "/nonexistent", "--t-max", "10"])
        .assert()
        .success();
}
