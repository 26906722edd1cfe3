mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("datasplit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DATASPLIT_ROOT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn organizes_archive() {
    let tmp = TempDir::new().unwrap();
    common::write_category_zip(&tmp.path().join("data.zip"), &[("cats", 5)]);

    cmd(&tmp)
        .args(["--model", "resnet", "data.zip"])
        .assert()
        .success()
        .stdout(contains("Data organized successfully for model 'resnet'."));

    assert_eq!(common::file_names(&tmp.path().join("res/resnet/cats/train")).len(), 4);
    assert_eq!(common::file_names(&tmp.path().join("res/resnet/cats/test")).len(), 1);
}

#[test]
fn warns_about_missing_archive() {
    let tmp = TempDir::new().unwrap();

    cmd(&tmp)
        .args(["-m", "resnet", "missing.zip"])
        .assert()
        .success()
        .stdout(contains("File not found: missing.zip"));
}

#[test]
fn missing_model_is_a_validation_error() {
    let tmp = TempDir::new().unwrap();

    cmd(&tmp)
        .args(["data.zip"])
        .assert()
        .code(2)
        .stderr(contains("Please provide a model name"));

    assert!(!tmp.path().join("res").exists());
}

#[test]
fn corrupt_archive_exit_code() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.zip"), b"garbage").unwrap();

    cmd(&tmp)
        .args(["-m", "resnet", "bad.zip"])
        .assert()
        .code(3)
        .stderr(contains("bad.zip"));
}

#[test]
fn custom_root_and_list_file() {
    let tmp = TempDir::new().unwrap();
    common::write_category_zip(&tmp.path().join("one.zip"), &[("cats", 5)]);
    common::write_category_zip(&tmp.path().join("two.zip"), &[("dogs", 5)]);
    fs::write(tmp.path().join("list.txt"), "one.zip\n\ntwo.zip\n").unwrap();

    cmd(&tmp)
        .args(["-m", "m", "--root", "out", "--from-list", "list.txt"])
        .assert()
        .success();

    assert!(tmp.path().join("out/m/cats/train").is_dir());
    assert!(tmp.path().join("out/m/dogs/test").is_dir());
    assert!(!tmp.path().join("res").exists());
}

#[test]
fn json_report() {
    let tmp = TempDir::new().unwrap();
    common::write_category_zip(&tmp.path().join("data.zip"), &[("cats", 10)]);

    let output = cmd(&tmp)
        .args(["-m", "m", "--quiet", "--output-format", "json", "data.zip"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).expect("valid json output");
    assert_eq!(report["type"], "report");
    assert_eq!(report["report"]["model"], "m");
    assert_eq!(report["report"]["files_copied"], 10);
    assert_eq!(report["report"]["archives"][0]["categories"][0]["train_files"], 8);
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    common::write_category_zip(&tmp.path().join("data.zip"), &[("cats", 10)]);

    cmd(&tmp)
        .args(["-m", "m", "--dry-run", "data.zip"])
        .assert()
        .success()
        .stdout(contains("cats: 8 train, 2 test"));

    assert!(!tmp.path().join("res").exists());
}

#[test]
fn generate_config_file() {
    let tmp = TempDir::new().unwrap();

    cmd(&tmp)
        .args(["--generate-config", "--config", "custom.toml"])
        .assert()
        .success()
        .stdout(contains("custom.toml"));

    let content = fs::read_to_string(tmp.path().join("custom.toml")).unwrap();
    assert!(content.contains("[staging]"));
}

#[test]
fn config_file_in_working_directory_is_used() {
    let tmp = TempDir::new().unwrap();
    common::write_category_zip(&tmp.path().join("data.zip"), &[("cats", 5)]);
    fs::write(
        tmp.path().join("datasplit.toml"),
        "[output]\nroot = \"configured\"\n",
    )
    .unwrap();

    cmd(&tmp).args(["-m", "m", "data.zip"]).assert().success();

    assert!(tmp.path().join("configured/m/cats/train").is_dir());
}

#[test]
fn invalid_exclusion_pattern_is_config_error() {
    let tmp = TempDir::new().unwrap();

    cmd(&tmp)
        .args(["-m", "m", "--exclude-category", "(", "data.zip"])
        .assert()
        .code(4)
        .stderr(contains("Configuration error").and(contains("exclusion")));
}

#[test]
fn missing_archive_is_reported_once() {
    let tmp = TempDir::new().unwrap();

    let output = cmd(&tmp)
        .args(["-m", "m", "nope.zip"])
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mentions = stdout.matches("File not found").count() + stderr.matches("File not found").count();
    assert_eq!(mentions, 1, "stdout: {}\nstderr: {}", stdout, stderr);
}

#[test]
fn json_output_is_line_delimited() {
    let tmp = TempDir::new().unwrap();
    common::write_category_zip(&tmp.path().join("data.zip"), &[("cats", 5)]);

    let output = cmd(&tmp)
        .args(["-m", "m", "--output-format", "json", "nope.zip", "data.zip"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("each stdout line is a JSON document"))
        .collect();

    assert!(lines.iter().any(|v| v["level"] == "warning"));
    let report = lines.last().unwrap();
    assert_eq!(report["type"], "report");
    assert_eq!(report["report"]["missing"].as_array().unwrap().len(), 1);
}
