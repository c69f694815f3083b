//! CLI integration tests for autolint.
//!
//! These tests run the binary against temporary packages and check exit
//! codes, text output and the JSON document.

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use autolint_test_utils::fixtures::Fixtures;
use autolint_test_utils::temp_project::TempProject;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::process::Command;

/// Get the autolint binary command, running in `project`.
fn autolint(project: &TempProject) -> Command {
    let mut cmd = Command::new(cargo_bin!("autolint"));
    cmd.env("NO_COLOR", "1")
        .env_remove("AUTOLINT_EXCLUDE")
        .env_remove("RUST_LOG")
        .arg("--working-dir")
        .arg(project.path());
    cmd
}

fn clean_project() -> TempProject {
    TempProject::new()
        .with_composer_json(Fixtures::psr4_composer_json("Acme\\", "src/"))
        .with_php_class("src/Foo.php", "Acme", "Foo")
        .build()
        .unwrap()
}

fn misplaced_project() -> TempProject {
    TempProject::new()
        .with_composer_json(Fixtures::psr4_composer_json("Acme\\", "src/"))
        .with_php_class("src/Wrong/Place.php", "Acme", "Place")
        .build()
        .unwrap()
}

fn psr0_warning_project() -> TempProject {
    TempProject::new()
        .with_composer_json(json!({ "autoload": { "psr-0": { "Acme\\Log\\Writer": "src/" } } }))
        .with_php_class("src/Acme/Log/Writer/File.php", "Acme\\Log\\Writer", "File")
        .build()
        .unwrap()
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--format").arg("json").output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap()
}

// ========== Help and Version Tests ==========

#[test]
fn test_help_output() {
    Command::new(cargo_bin!("autolint"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("autoload"))
        .stdout(predicate::str::contains("--no-dev"))
        .stdout(predicate::str::contains("--severity"));
}

#[test]
fn test_version_output() {
    Command::new(cargo_bin!("autolint"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("autolint"));
}

// ========== Validation Tests ==========

#[test]
fn test_clean_package_succeeds() {
    autolint(&clean_project())
        .assert()
        .success()
        .stdout(predicate::str::contains("No autoload violations (1 classes)"));
}

#[test]
fn test_misplaced_class_fails() {
    autolint(&misplaced_project())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Class Acme\\Place"))
        .stdout(predicate::str::contains("Validation failed: 1 error"));
}

#[test]
fn test_quiet_prints_only_violations() {
    autolint(&misplaced_project())
        .arg("--quiet")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[autoload.psr-4]"))
        .stdout(predicate::str::contains("Validation failed").not())
        .stdout(predicate::str::contains("Autolint").not());
}

#[test]
fn test_warning_alone_passes() {
    autolint(&psr0_warning_project())
        .assert()
        .success()
        .stdout(predicate::str::contains("should end with a namespace separator"));
}

#[test]
fn test_strict_escalates_warnings() {
    autolint(&psr0_warning_project())
        .arg("--strict")
        .assert()
        .code(1);
}

#[test]
fn test_silenced_warning_is_not_printed() {
    autolint(&psr0_warning_project())
        .args(["--strict", "--severity", "warning=silence"])
        .assert()
        .success()
        .stdout(predicate::str::contains("should end with a namespace separator").not());
}

#[test]
fn test_exclude_hides_misplaced_class() {
    autolint(&misplaced_project())
        .args(["--exclude", "/Wrong/"])
        .assert()
        .success();
}

#[test]
fn test_exclude_from_env() {
    autolint(&misplaced_project())
        .env("AUTOLINT_EXCLUDE", "/Wrong/")
        .assert()
        .success();
}

#[test]
fn test_no_dev_skips_dev_section() {
    let project = TempProject::new()
        .with_composer_json(json!({
            "autoload": { "psr-4": { "Acme\\": "src/" } },
            "autoload-dev": { "files": ["tests/bootstrap.php"] }
        }))
        .with_php_class("src/Foo.php", "Acme", "Foo")
        .build()
        .unwrap();

    autolint(&project).assert().code(1);
    autolint(&project).arg("--no-dev").assert().success();
}

// ========== Error Tests ==========

#[test]
fn test_missing_manifest_is_an_error() {
    let project = clean_project();
    std::fs::remove_file(project.composer_json_path()).unwrap();

    autolint(&project)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E0401"));
}

#[test]
fn test_malformed_manifest_is_an_error() {
    let project = TempProject::new()
        .with_raw_composer_json("{ \"autoload\": ")
        .build()
        .unwrap();

    autolint(&project)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("E0201"));
}

#[test]
fn test_unknown_loader_type_is_an_error() {
    let project = TempProject::new()
        .with_composer_json(json!({ "autoload": { "psr-5": { "Acme\\": "src/" } } }))
        .build()
        .unwrap();

    autolint(&project)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("psr-5"))
        .stderr(predicate::str::contains("Supported types are"));
}

#[test]
fn test_invalid_severity_is_a_usage_error() {
    autolint(&clean_project())
        .args(["--severity", "warning=loud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown severity").or(predicate::str::contains("loud")));
}

// ========== JSON Output Tests ==========

#[test]
fn test_json_report() {
    let project = misplaced_project();
    let report = json_output(&mut autolint(&project));

    assert_eq!(report["failed"], true);
    assert_eq!(report["errors"], 1);
    assert_eq!(report["warnings"], 0);
    let violation = &report["violations"]["error"][0];
    assert_eq!(violation["kind"], "ClassFoundInWrongFile");
    assert_eq!(violation["validator"], "autoload.psr-4");
    assert_eq!(
        violation["params"]["fileShould"],
        project.display_path("src/Place.php").as_str()
    );
}

#[test]
fn test_json_clean_report() {
    let report = json_output(&mut autolint(&clean_project()));
    assert_eq!(report["failed"], false);
    assert_eq!(report["violations"], json!({}));
}

#[test]
fn test_json_lists_ambiguous_classes() {
    let project = TempProject::new()
        .with_composer_json(json!({ "autoload": { "classmap": ["lib/"] } }))
        .with_php_class("lib/a/Dup.php", "Acme", "Dup")
        .with_php_class("lib/b/Dup.php", "Acme", "Dup")
        .build()
        .unwrap();

    let report = json_output(&mut autolint(&project));
    assert_eq!(report["failed"], false);
    assert_eq!(report["ambiguities"][0]["validator"], "autoload.classmap");
    let message = report["ambiguities"][0]["message"].as_str().unwrap();
    assert!(message.contains("Acme\\Dup"));
}

#[test]
fn test_text_notes_ambiguous_classes() {
    let project = TempProject::new()
        .with_composer_json(json!({ "autoload": { "classmap": ["lib/"] } }))
        .with_php_class("lib/a/Dup.php", "Acme", "Dup")
        .with_php_class("lib/b/Dup.php", "Acme", "Dup")
        .build()
        .unwrap();

    autolint(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("[autoload.classmap] Ambiguous class resolution"));
}

#[test]
fn test_json_error_document() {
    let project = TempProject::new()
        .with_composer_json(json!({ "autoload": { "psr-5": [] } }))
        .build()
        .unwrap();

    let document = json_output(&mut autolint(&project));
    assert_eq!(document["failed"], true);
    assert_eq!(document["error"]["code"], "E0101");
}
