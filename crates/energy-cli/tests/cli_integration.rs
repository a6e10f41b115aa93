//! CLI integration tests for energy-cli
//!
//! Drive the `energy` binary end to end against scratch CSV files.

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Create an energy command with logging silenced
fn energy() -> Command {
    let mut cmd = Command::cargo_bin("energy").expect("Failed to find energy binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

const HEADER: &str = "building_id,building_type,square_footage,year_built,heating_type,occupant_count,month,avg_temperature,avg_humidity,energy_consumption";

/// Write a raw table with `n` labeled rows and return its path
fn raw_table(dir: &TempDir, n: usize) -> PathBuf {
    let mut csv = format!("{HEADER}\n");
    for i in 0..n {
        let commercial = i % 2 == 0;
        let sqft = 1000 + 150 * (i % 9);
        let temperature = -5.0 + 2.5 * (i % 12) as f64;
        let energy = if commercial { 1.4 } else { 0.9 } * sqft as f64 - 15.0 * temperature + 2000.0;
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{:.1}\n",
            i + 1,
            if commercial { "Commercial" } else { "Residential" },
            sqft,
            1960 + (i % 40),
            if i % 3 == 0 { "Electric" } else { "Gas" },
            2 + i % 10,
            1 + i % 12,
            temperature,
            50 + i % 20,
            energy
        ));
    }
    let path = dir.path().join("raw_data.csv");
    std::fs::write(&path, csv).unwrap();
    path
}

const BUILDING: [&str; 14] = [
    "--building-type",
    "Commercial",
    "--square-footage",
    "1500",
    "--year-built",
    "1980",
    "--heating-type",
    "Gas",
    "--occupants",
    "12",
    "--temperature",
    "-2",
    "--humidity",
    "65",
];

fn fast(cmd: &mut Command) -> &mut Command {
    cmd.args(["--n-estimators", "10"])
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_lists_subcommands() {
    energy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("derive"))
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("predict"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("summary"));
}

#[test]
fn test_no_subcommand_is_usage_error() {
    energy().assert().failure().code(2);
}

// ============================================================================
// derive
// ============================================================================

#[test]
fn test_derive_writes_processed_table() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 6);
    let processed = dir.path().join("processed").join("processed_data.csv");

    energy()
        .arg("derive")
        .arg(&raw)
        .arg("-o")
        .arg(&processed)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows"));

    let contents = read(&processed);
    let header = contents.lines().next().unwrap();
    assert!(header.starts_with("building_id,"));
    assert!(header.ends_with(
        "building_age,energy_per_sqft,building_type_encoded,heating_type_encoded"
    ));
    assert_eq!(contents.lines().count(), 7);
}

#[test]
fn test_derive_missing_input() {
    let dir = TempDir::new().unwrap();
    energy()
        .arg("derive")
        .arg(dir.path().join("absent.csv"))
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_derive_malformed_row() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw.csv");
    std::fs::write(
        &raw,
        format!("{HEADER}\n1,Commercial,big,2000,Gas,3,1,5,60,1000\n"),
    )
    .unwrap();

    energy()
        .arg("derive")
        .arg(&raw)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("line 2"))
        .stderr(predicate::str::contains("square_footage"));
}

#[test]
fn test_derive_json_output() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 4);
    let output = energy()
        .arg("derive")
        .arg(&raw)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["rows"], 4);
    assert_eq!(value["reference_year"], 2024);
    assert_eq!(value["building_types"][0], "Commercial");
}

// ============================================================================
// train
// ============================================================================

#[test]
fn test_train_writes_report_and_model() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 30);
    let report = dir.path().join("reports").join("results.txt");
    let model = dir.path().join("model.json");

    let mut cmd = energy();
    cmd.arg("train")
        .arg(&raw)
        .arg("--report")
        .arg(&report)
        .arg("--save-model")
        .arg(&model);
    fast(&mut cmd)
        .assert()
        .success()
        .stdout(predicate::str::contains("MAE"))
        .stdout(predicate::str::contains("TOP FEATURES"));

    assert!(read(&report).contains("R2:"));
    assert!(model.exists());
}

#[test]
fn test_train_without_labels() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw.csv");
    std::fs::write(
        &raw,
        format!("{HEADER}\n1,Commercial,1000,2000,Gas,3,1,5,60,\n"),
    )
    .unwrap();

    energy()
        .arg("train")
        .arg(&raw)
        .assert()
        .failure()
        .code(6)
        .stderr(predicate::str::contains("empty dataset"));
}

#[test]
fn test_train_rejects_bad_test_size() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 10);
    energy()
        .arg("train")
        .arg(&raw)
        .args(["--test-size", "1.5"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("test_size"));
}

#[test]
fn test_train_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 12);
    let config = dir.path().join("energy.json");
    std::fs::write(&config, r#"{ "forest": { "n_estimators": 0 } }"#).unwrap();

    energy()
        .arg("train")
        .arg(&raw)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("n_estimators"));
}

// ============================================================================
// predict
// ============================================================================

#[test]
fn test_predict_from_raw_table() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 24);

    let mut cmd = energy();
    cmd.arg("predict").arg(&raw).args(BUILDING);
    fast(&mut cmd)
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated consumption"))
        .stdout(predicate::str::contains("kWh"))
        .stdout(predicate::str::contains("age 44"))
        .stdout(predicate::str::contains("Recommendations"));
}

#[test]
fn test_predict_from_saved_model_json() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 24);
    let model = dir.path().join("model.json");

    let mut train = energy();
    train.arg("train").arg(&raw).arg("--save-model").arg(&model);
    fast(&mut train).assert().success();

    let output = energy()
        .arg("predict")
        .arg("--model")
        .arg(&model)
        .args(BUILDING)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["estimate"].as_f64().unwrap() > 0.0);
    assert_eq!(value["building_age"], 44);
    let total: f64 = value["importances"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["importance"].as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[test]
fn test_predict_unseen_building_type() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 10);

    let mut args = BUILDING;
    args[1] = "Industrial";
    let mut cmd = energy();
    cmd.arg("predict").arg(&raw).args(args);
    fast(&mut cmd)
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("Industrial"));
}

// ============================================================================
// add
// ============================================================================

#[test]
fn test_add_creates_file_and_assigns_ids() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("new.csv");

    energy()
        .arg("add")
        .arg(&raw)
        .args(BUILDING)
        .args(["--month", "2", "--energy", "4200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added building 1"));

    energy()
        .arg("add")
        .arg(&raw)
        .args(BUILDING)
        .args(["--month", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added building 2"));

    let contents = read(&raw);
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("2,Commercial,"));
    assert!(lines[2].ends_with(','));
}

#[test]
fn test_add_appends_after_max_id() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 5);

    energy()
        .arg("add")
        .arg(&raw)
        .args(BUILDING)
        .args(["--month", "7", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"building_id\": 6"));
}

#[test]
fn test_add_rejects_invalid_month() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 3);
    let before = read(&raw);

    energy()
        .arg("add")
        .arg(&raw)
        .args(BUILDING)
        .args(["--month", "13"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("month"));

    assert_eq!(read(&raw), before);
}

#[test]
fn test_add_rejects_building_after_reference_year() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 3);
    let before = read(&raw);

    let mut args = BUILDING;
    args[5] = "2030";
    energy()
        .arg("add")
        .arg(&raw)
        .args(args)
        .args(["--month", "5"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("year_built"))
        .stderr(predicate::str::contains("2024"));

    assert_eq!(read(&raw), before);
    energy()
        .arg("derive")
        .arg(&raw)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .assert()
        .success();
}

#[test]
fn test_add_honours_reference_year_override() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 3);

    let mut args = BUILDING;
    args[5] = "2030";
    energy()
        .arg("add")
        .arg(&raw)
        .args(args)
        .args(["--month", "5", "--reference-year", "2030"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added building 4"));
}

#[test]
fn test_derive_short_row_is_malformed() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("raw.csv");
    std::fs::write(
        &raw,
        format!("{HEADER}\n1,Commercial,1000,2000,Gas,3,1,5,60,1000\n2,Residential,900\n"),
    )
    .unwrap();

    energy()
        .arg("derive")
        .arg(&raw)
        .arg("-o")
        .arg(dir.path().join("out.csv"))
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("line 3"));
}

// ============================================================================
// summary
// ============================================================================

#[test]
fn test_summary_text() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 8);
    energy()
        .arg("summary")
        .arg(&raw)
        .assert()
        .success()
        .stdout(predicate::str::contains("Commercial"))
        .stdout(predicate::str::contains("Residential"))
        .stdout(predicate::str::contains("kWh per °C"));
}

#[test]
fn test_summary_json() {
    let dir = TempDir::new().unwrap();
    let raw = raw_table(&dir, 8);
    let output = energy()
        .arg("summary")
        .arg(&raw)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["n_records"], 8);
    assert_eq!(value["n_labeled"], 8);
    assert_eq!(value["by_type"].as_array().unwrap().len(), 2);
    assert_eq!(value["by_type"][0]["count"], 4);
}
