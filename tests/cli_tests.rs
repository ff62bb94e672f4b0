use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rangekeeper() -> Command {
    let mut cmd = Command::cargo_bin("rangekeeper").expect("binary built");
    cmd.env_remove("WALLET_PRIVATE_KEY")
        .env_remove("RUST_LOG")
        .current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn decide_previews_fallback_mint_as_json() {
    let output = rangekeeper()
        .args(["--json", "decide", "--tick", "-201600", "--strategy", "balanced"])
        .output()
        .expect("run rangekeeper");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).expect("json output");

    assert_eq!(value["command"], "decide");
    assert_eq!(value["decision"]["action"], "MINT");
    assert_eq!(value["decision"]["tickLower"], -202_200);
    assert_eq!(value["decision"]["tickUpper"], -201_000);
    assert_eq!(value["decision"]["confidence"], 75);
}

#[test]
fn decide_rebalances_with_drifted_position() {
    let output = rangekeeper()
        .args([
            "--json",
            "decide",
            "--tick",
            "-195000",
            "--position",
            "-202200:-201000",
        ])
        .output()
        .expect("run rangekeeper");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["decision"]["action"], "REBALANCE");
    assert_eq!(value["decision"]["confidence"], 70);
}

#[test]
fn decide_prints_human_readable_fields() {
    rangekeeper()
        .args(["decide", "--tick", "-201600", "--strategy", "aggressive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MINT"))
        .stdout(predicate::str::contains("[-201900, -201300]  width 600"))
        .stdout(predicate::str::contains("75%"));
}

#[test]
fn quiet_decide_prints_nothing() {
    rangekeeper()
        .args(["--quiet", "decide", "--tick", "-201600"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn decide_rejects_malformed_position() {
    rangekeeper()
        .args(["decide", "--tick", "0", "--position", "10"])
        .assert()
        .failure();
}

#[test]
fn status_with_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    rangekeeper()
        .args(["status", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn process_with_invalid_config_names_the_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let example = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.toml"))
        .expect("read example config");
    fs::write(&path, example.replace("tick_spacing = 60", "tick_spacing = -1")).unwrap();

    rangekeeper()
        .args(["process", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_spacing"));
}
