//! End-to-end CLI tests driving `interview simulate` as a subprocess.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).parent().unwrap().parent().unwrap().join("demos").join(name)
}

#[test]
fn simulate_engaged_persona_prints_a_json_transcript() {
    let mut cmd = Command::cargo_bin("interview").unwrap();
    let output = cmd
        .arg("simulate")
        .arg("--methodology")
        .arg(demo_path("means_end_chain.yaml"))
        .arg("--concept")
        .arg(demo_path("oat_milk.yaml"))
        .arg("--persona")
        .arg("engaged")
        .arg("--max-turns")
        .arg("3")
        .output()
        .expect("failed to run interview simulate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let transcript: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    let turns = transcript["turns"].as_array().expect("transcript should have a turns array");
    assert!(!turns.is_empty());
    assert!(turns.len() <= 3);
}

#[test]
fn simulate_with_unknown_persona_fails_with_configuration_exit_code() {
    let mut cmd = Command::cargo_bin("interview").unwrap();
    cmd.arg("simulate")
        .arg("--methodology")
        .arg(demo_path("means_end_chain.yaml"))
        .arg("--concept")
        .arg(demo_path("oat_milk.yaml"))
        .arg("--persona")
        .arg("nonexistent")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn simulate_with_missing_methodology_file_fails_with_configuration_exit_code() {
    let mut cmd = Command::cargo_bin("interview").unwrap();
    cmd.arg("simulate")
        .arg("--methodology")
        .arg(demo_path("does_not_exist.yaml"))
        .arg("--concept")
        .arg(demo_path("oat_milk.yaml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("configuration error"));
}
