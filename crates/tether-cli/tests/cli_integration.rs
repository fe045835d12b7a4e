// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use assert_cmd::Command;
use predicates::prelude::*;

fn tether(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tether").expect("binary");
    cmd.arg("--config-dir").arg(dir.path());
    cmd
}

#[test]
fn simulate_reports_landings() {
    let dir = tempfile::tempdir().expect("tempdir");
    tether(&dir)
        .args(["simulate", "--frames", "120", "--bodies", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("collision/begin"))
        .stdout(predicate::str::contains("entity#1 landed"));
}

#[test]
fn simulate_json_lines_parse() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = tether(&dir)
        .args(["simulate", "--frames", "60", "--bodies", "1", "--every", "20", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect();
    // 3 samples of one body, then the summary.
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["frame"], 20);
    assert!(lines[3]["events"]["step/begin"].as_u64().unwrap_or(0) > 0);
}

#[test]
fn config_init_then_show() {
    let dir = tempfile::tempdir().expect("tempdir");
    tether(&dir).args(["config", "init"]).assert().success();
    tether(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    tether(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_sub_steps\": 10"));
}

#[test]
fn invalid_profile_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("world.json"), br#"{ "max_sub_steps": 0 }"#).expect("write");
    tether(&dir)
        .args(["simulate", "--frames", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid max_sub_steps"));
}
