//! Integration tests for the luna binary.
//!
//! These tests drive the CLI end to end against a temporary data directory
//! and config file, with a fixed `--today` so predictions are stable.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI pointed at the temp dir for both data and config
fn cli(dir: &Path, today: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("luna"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--today")
        .arg(today);
    cmd
}

fn predict_json(dir: &Path, today: &str) -> serde_json::Value {
    let output = cli(dir, today)
        .arg("predict")
        .arg("--json")
        .output()
        .expect("Failed to run predict");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("predict --json should print JSON")
}

fn dates(value: &serde_json::Value, key: &str) -> Vec<String> {
    value[key]
        .as_array()
        .unwrap_or_else(|| panic!("missing {}", key))
        .iter()
        .map(|d| d.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("luna"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("menstrual cycle tracker"));
}

#[test]
fn test_default_command_without_data() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough data yet"));
}

#[test]
fn test_log_creates_period_file() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .arg("log")
        .arg("2024-01-01")
        .arg("--days")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 3 period days starting 2024-01-01"));

    let contents = fs::read_to_string(temp_dir.path().join("data/period_days.json")).unwrap();
    assert_eq!(contents, r#"["2024-01-01","2024-01-02","2024-01-03"]"#);

    // Logging the same day again is a no-op
    cli(temp_dir.path(), "2024-01-10")
        .arg("log")
        .arg("2024-01-02")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing changed"));
}

#[test]
fn test_log_defaults_to_today() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-03-05")
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged period day 2024-03-05"));
}

#[test]
fn test_unlog_removes_day() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .args(["log", "2024-01-01", "--days", "2"])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-10")
        .args(["unlog", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed period day 2024-01-02"));

    cli(temp_dir.path(), "2024-01-10")
        .args(["unlog", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("was not logged"));
}

#[test]
fn test_episodes_split_on_gap() {
    let temp_dir = setup_test_dir();

    for day in ["2024-01-01", "2024-01-02", "2024-01-04", "2024-01-05"] {
        cli(temp_dir.path(), "2024-01-10")
            .args(["log", day])
            .assert()
            .success();
    }

    cli(temp_dir.path(), "2024-01-10")
        .arg("episodes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Periods (2):"))
        .stdout(predicate::str::contains("2024-01-01 → 2024-01-02"))
        .stdout(predicate::str::contains("2024-01-04 → 2024-01-05"));
}

#[test]
fn test_predict_json_from_single_day() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-01")
        .args(["log", "2024-01-01"])
        .assert()
        .success();

    let prediction = predict_json(temp_dir.path(), "2024-01-01");

    let periods = dates(&prediction, "predicted_periods");
    assert_eq!(periods.len(), 35);
    assert_eq!(periods.first().unwrap(), "2024-01-02");
    assert_eq!(periods.last().unwrap(), "2024-06-21");
    assert!(!periods.contains(&"2024-01-01".to_string()));

    let ovulation = dates(&prediction, "ovulation_days");
    assert!(ovulation.contains(&"2024-01-15".to_string()));

    let fertile = dates(&prediction, "fertile_window");
    for day in ["2024-01-10", "2024-01-15"] {
        assert!(fertile.contains(&day.to_string()));
    }
}

#[test]
fn test_predict_without_data() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-01")
        .arg("predict")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough data to predict yet"));

    let prediction = predict_json(temp_dir.path(), "2024-01-01");
    assert!(dates(&prediction, "predicted_periods").is_empty());
    assert!(dates(&prediction, "fertile_window").is_empty());
    assert!(dates(&prediction, "ovulation_days").is_empty());
}

#[test]
fn test_predict_text_collapses_ranges() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-01")
        .args(["log", "2024-01-01"])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-01")
        .arg("predict")
        .assert()
        .success()
        .stdout(predicate::str::contains("Predicted periods:"))
        .stdout(predicate::str::contains("2024-01-02 to 2024-01-05"))
        .stdout(predicate::str::contains("2024-01-29 to 2024-02-02"))
        .stdout(predicate::str::contains("2024-01-10 to 2024-01-15"));
}

#[test]
fn test_status_reports_cycle_position() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .args(["log", "2024-01-01", "--days", "5"])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-10")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("FOLLICULAR PHASE"))
        .stdout(predicate::str::contains("Cycle day 10 of 28"))
        .stdout(predicate::str::contains("Next period: 2024-01-29 (in 19 days)"))
        .stdout(predicate::str::contains("Ovulation: 2024-01-15"));
}

#[test]
fn test_calendar_month() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .args(["log", "2024-01-01"])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-10")
        .args(["calendar", "--month", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("February 2024"))
        .stdout(predicate::str::contains(" Su  Mo  Tu  We  Th  Fr  Sa"));

    cli(temp_dir.path(), "2024-01-10")
        .args(["calendar", "--month", "2024-13"])
        .assert()
        .failure();
}

#[test]
fn test_track_and_show() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .args([
            "track",
            "2024-01-02",
            "--flow",
            "heavy",
            "--symptom",
            "cramps",
            "--symptom",
            "headache",
            "--notes",
            "stayed in",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved record for 2024-01-02"));

    // A second call merges into the same day
    cli(temp_dir.path(), "2024-01-10")
        .args([
            "track",
            "2024-01-02",
            "--mood",
            "calm",
            "--sex-drive",
            "high",
            "--breast",
            "tender",
            "--psych",
            "focused",
            "--psych",
            "distracted",
        ])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-10")
        .args(["show", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Flow: heavy"))
        .stdout(predicate::str::contains("Symptoms: cramps, headache"))
        .stdout(predicate::str::contains("Mood: calm"))
        .stdout(predicate::str::contains("Sex drive: high"))
        .stdout(predicate::str::contains("Breasts: tender"))
        .stdout(predicate::str::contains("Capacity: focused, distracted"))
        .stdout(predicate::str::contains("Notes: stayed in"));

    let stored = fs::read_to_string(temp_dir.path().join("data/day_records.json")).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["2024-01-02"]["sex_drive"], "high");
    assert_eq!(stored["2024-01-02"]["breast"], "tender");
    assert_eq!(
        stored["2024-01-02"]["psychological"],
        serde_json::json!(["focused", "distracted"])
    );

    cli(temp_dir.path(), "2024-01-10")
        .args(["track", "2024-01-02", "--clear"])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-10")
        .args(["show", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing tracked"));
}

#[test]
fn test_track_rejects_empty_and_unknown_values() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-10")
        .args(["track", "2024-01-02"])
        .assert()
        .failure();

    cli(temp_dir.path(), "2024-01-10")
        .args(["track", "2024-01-02", "--flow", "torrential"])
        .assert()
        .failure();

    cli(temp_dir.path(), "2024-01-10")
        .args(["track", "2024-01-02", "--breast", "aching"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("data/day_records.json").exists());
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let out = temp_dir.path().join("out/luna.csv");

    cli(temp_dir.path(), "2024-01-01")
        .args(["log", "2024-01-01"])
        .assert()
        .success();
    cli(temp_dir.path(), "2024-01-01")
        .args(["track", "2024-01-01", "--flow", "medium"])
        .assert()
        .success();

    cli(temp_dir.path(), "2024-01-01")
        .arg("export")
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported"));

    let contents = fs::read_to_string(&out).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("date,logged_period,predicted_period"));
    assert!(contents.contains("2024-01-01,true,false,false,false,medium"));
}

#[test]
fn test_setup_saves_config_and_anchors_predictions() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-01")
        .args([
            "setup",
            "--cycle-length",
            "30",
            "--period-length",
            "4",
            "--goal",
            "fertility",
            "--last-period",
            "2024-01-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle: 30 days, period: 4 days"));

    let config = fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    assert!(config.contains("cycle_length = 30"));
    assert!(config.contains("goal = \"fertility\""));

    // Nothing logged yet, so the configured start anchors the prediction
    let prediction = predict_json(temp_dir.path(), "2024-01-01");
    let periods = dates(&prediction, "predicted_periods");
    assert_eq!(periods.first().unwrap(), "2024-01-01");
    assert!(periods.contains(&"2024-01-31".to_string()));
    assert!(dates(&prediction, "ovulation_days").contains(&"2024-01-17".to_string()));
}

#[test]
fn test_setup_rejects_out_of_range_values() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-01-01")
        .args(["setup", "--cycle-length", "60", "--period-length", "5"])
        .assert()
        .failure();

    cli(temp_dir.path(), "2024-01-01")
        .args(["setup", "--cycle-length", "28", "--period-length", "0"])
        .assert()
        .failure();

    cli(temp_dir.path(), "2024-01-01")
        .args(["setup", "--cycle-length", "28", "--period-length", "5", "--goal", "maybe"])
        .assert()
        .failure();

    assert!(!temp_dir.path().join("config.toml").exists());
}

#[test]
fn test_invalid_today_is_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "2024-02-30")
        .arg("status")
        .assert()
        .failure();
}
