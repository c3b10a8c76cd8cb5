use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn grocer() -> Command {
    Command::cargo_bin("grocer").unwrap()
}

/// A workspace with a default config file and an input folder.
fn workspace() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    grocer()
        .args(["config", "init", "--output"])
        .arg(&config)
        .assert()
        .success();
    fs::create_dir(dir.path().join("pdfs")).unwrap();
    let config = config.to_string_lossy().into_owned();
    (dir, config)
}

fn write_garbage(dir: &Path, name: &str) {
    fs::write(dir.join("pdfs").join(name), b"not really a pdf").unwrap();
}

#[test]
fn help_lists_subcommands() {
    grocer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cost"))
        .stdout(predicate::str::contains("quantity"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn empty_folder_is_an_error() {
    let (dir, config) = workspace();

    grocer()
        .args(["--config", &config, "cost"])
        .arg(dir.path().join("pdfs"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF files found in"));
}

#[test]
fn unreadable_receipt_becomes_error_row() {
    let (dir, config) = workspace();
    write_garbage(dir.path(), "ORDER-1-2025-01-05.pdf");

    grocer()
        .args(["--config", &config, "cost"])
        .arg(dir.path().join("pdfs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("ORDER-1-2025-01-05.pdf"))
        .stdout(predicate::str::contains("Error"))
        .stdout(predicate::str::contains("DELIVERY COST ANALYSIS SUMMARY:"))
        .stdout(predicate::str::contains("Total number of orders analyzed: 1"));
}

#[test]
fn json_output_shape() {
    let (dir, config) = workspace();
    write_garbage(dir.path(), "b.pdf");
    write_garbage(dir.path(), "a.pdf");

    let output = grocer()
        .args(["--config", &config, "quantity", "--format", "json"])
        .arg(dir.path().join("pdfs"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["metric"], "item_weight_kg");
    assert_eq!(json["failed"], 2);
    assert_eq!(json["records"][0]["source_id"], "a.pdf");
    assert_eq!(json["records"][1]["source_id"], "b.pdf");
    assert_eq!(json["records"][0]["order_date"], "Error");
    assert_eq!(json["records"][0]["item_weight_kg"], 0.0);
    assert_eq!(json["summary"]["order_count"], 2);
    assert!(json["summary"]["peak_month"].is_null());
}

#[test]
fn csv_written_to_file() {
    let (dir, config) = workspace();
    write_garbage(dir.path(), "ORDER-9-2025-03-01.pdf");
    let out = dir.path().join("report.csv");

    grocer()
        .args(["--config", &config, "cost", "--format", "csv", "--output"])
        .arg(&out)
        .arg(dir.path().join("pdfs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("file,order_number,order_date,total_cost"));
    assert!(csv.contains("ORDER-9-2025-03-01.pdf,Error,Error,0"));
}

#[test]
fn config_set_and_get() {
    let (_dir, config) = workspace();

    grocer()
        .args(["--config", &config, "config", "set", "cost.baskets_per_order", "3"])
        .assert()
        .success();

    grocer()
        .args(["--config", &config, "config", "get", "cost.baskets_per_order"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));

    grocer()
        .args(["--config", &config, "config", "set", "cost.tip", "1"])
        .assert()
        .failure();
}

#[test]
fn config_init_refuses_overwrite() {
    let (_dir, config) = workspace();

    grocer()
        .args(["config", "init", "--output", &config])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
