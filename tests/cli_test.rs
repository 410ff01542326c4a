//! End-to-end tests for the Infrascan CLI
//!
//! These tests run the compiled binary against temporary directory trees
//! and verify exit codes, terminal output, and the written report.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn get_cmd() -> Command {
    Command::cargo_bin("infrascan").unwrap()
}

#[test]
fn scan_with_findings_exits_one_and_writes_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Dockerfile"), "FROM node:latest\nUSER root\n").unwrap();

    let report_path = root.join("report.json");

    get_cmd()
        .arg(root)
        .arg("-o")
        .arg(&report_path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("SCAN RESULTS"))
        .stdout(predicate::str::contains("Total findings"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert!(report["summary"]["Total Findings"].as_u64().unwrap() >= 2);
    assert!(report["summary"]["Critical"].as_u64().unwrap() >= 1);
}

#[test]
fn clean_tree_exits_zero() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Dockerfile"), "FROM alpine:3.19\nUSER app\n").unwrap();

    get_cmd()
        .arg(root)
        .arg("-o")
        .arg(root.join("report.json"))
        .assert()
        .code(0);
}

#[test]
fn missing_directory_exits_two() {
    let temp_dir = TempDir::new().unwrap();

    get_cmd()
        .arg(temp_dir.path().join("does-not-exist"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn provider_filter_limits_findings() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Dockerfile"), "FROM node:latest\n").unwrap();
    fs::write(root.join("main.tf"), "").unwrap();

    let report_path = root.join("report.json");

    get_cmd()
        .arg(root)
        .args(["-p", "terraform"])
        .arg("-o")
        .arg(&report_path)
        .assert()
        .code(0);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["Total Findings"], 0);
}

#[test]
fn min_severity_flag_filters_the_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    // DOCKER005 (MEDIUM) is the only rule that fires here
    fs::write(root.join("Dockerfile"), "FROM alpine:3.19\nEXPOSE 22\n").unwrap();

    let report_path = root.join("report.json");

    get_cmd()
        .arg(root)
        .args(["-s", "high"])
        .arg("-o")
        .arg(&report_path)
        .assert()
        .code(0);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["Total Findings"], 0);
}

#[test]
fn invalid_severity_is_a_usage_error() {
    get_cmd()
        .args(["-s", "URGENT"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown severity"));
}

#[test]
fn config_file_in_scan_root_is_honored() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("skipme")).unwrap();
    fs::write(root.join("skipme/Dockerfile"), "FROM node:latest\n").unwrap();
    fs::write(root.join("Dockerfile"), "FROM alpine:3.19\nUSER app\n").unwrap();

    let report_path = root.join("report.json");
    fs::write(
        root.join(".infrascan.toml"),
        format!("exclude = [\"skipme\"]\noutput = \"{}\"\n", report_path.display()),
    )
    .unwrap();

    get_cmd().arg(root).assert().code(0);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["Total Findings"], 0);
}

#[test]
fn invalid_config_file_exits_two() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join(".infrascan.toml"), "providers = [\"chef\"]\n").unwrap();

    get_cmd()
        .arg(root)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown provider"));
}

#[test]
fn sequential_flag_produces_the_same_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Dockerfile"), "FROM node:latest\nUSER root\n").unwrap();
    fs::write(
        root.join("main.tf"),
        "resource \"aws_s3_bucket\" \"b\" {\n  acl = \"public-read\"\n}\n",
    )
    .unwrap();

    let mut summaries = Vec::new();
    for args in [vec![], vec!["--sequential"]] {
        let report_path = root.join("report.json");
        get_cmd()
            .arg(root)
            .args(&args)
            .arg("-o")
            .arg(&report_path)
            .assert()
            .code(1);

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        summaries.push(report["summary"].clone());
    }

    assert_eq!(summaries[0], summaries[1]);
}
