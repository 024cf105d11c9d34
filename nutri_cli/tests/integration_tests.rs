//! Integration tests for the nutri binary.
//!
//! These tests verify end-to-end behavior including:
//! - Catalog search and meal plan listing
//! - Custom plan building and scanning
//! - Scripted sessions and their JSON summaries
//! - Config file overrides

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nutri"))
}

/// Helper to write a config file into a fresh temp dir
fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    (temp_dir, path)
}

/// Run the binary and parse stdout as JSON
fn run_json(args: &[&str]) -> serde_json::Value {
    let output = cli().args(args).arg("--json").output().expect("Failed to run");
    assert!(
        output.status.success(),
        "nutri {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "NutriLabz nutrition and fitness session simulator",
        ));
}

#[test]
fn test_foods_query() {
    cli()
        .args(["foods", "--query", "rice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Basmati Rice"))
        .stdout(predicate::str::contains("Brown Rice"))
        .stdout(predicate::str::contains("Naan").not());
}

#[test]
fn test_foods_halal_filter_can_empty_results() {
    cli()
        .args(["foods", "--filter", "East Asian", "--halal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No foods found."));
}

#[test]
fn test_foods_unknown_filter_fails() {
    cli()
        .args(["foods", "--filter", "soup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("soup"));
}

#[test]
fn test_meals_diabetic_ordering() {
    let plans = run_json(&["meals", "--category", "weight-loss", "--diabetic"]);
    let ids: Vec<_> = plans
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["5", "1"]);
}

#[test]
fn test_plan_builds_estimate() {
    cli()
        .args(["plan", "Squats", "Planks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CUSTOM PLAN 1"))
        .stdout(predicate::str::contains("Duration: 10 min, ~100 kcal"));
}

#[test]
fn test_plan_rejects_unknown_exercise() {
    cli()
        .args(["plan", "Juggling"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Juggling"));
}

#[test]
fn test_scan_is_reproducible_with_seed() {
    let first = run_json(&["scan", "--seed", "42"]);
    let second = run_json(&["scan", "--seed", "42"]);
    assert_eq!(first, second);

    let confidence = first["confidence"].as_f64().unwrap();
    assert!((0.75..=0.95).contains(&confidence));
    assert_eq!(first["fallback"], true);
}

#[test]
fn test_run_script_summary() {
    let snapshot = run_json(&[
        "run",
        "--seed",
        "1",
        "eat:Chapati",
        "eat:Samosa=262",
        "workout:morning_cardio",
        "wait:40s",
        "meal:3",
    ]);

    assert_eq!(snapshot["nutrition"]["total_calories"], 366);
    assert_eq!(
        snapshot["nutrition"]["logged_foods"].as_array().unwrap().len(),
        2
    );
    assert_eq!(snapshot["workout"]["phase"], "completed");
    assert_eq!(snapshot["workout"]["workout_id"], "morning_cardio");
    assert_eq!(snapshot["physiology"]["calories_burned"], 885);
    assert_eq!(snapshot["active_meal_plans"][0], "3");
    assert_eq!(snapshot["pending_timers"], 0);
    assert_eq!(snapshot["screen"]["screen"], "main");
}

#[test]
fn test_run_text_summary() {
    cli()
        .args(["run", "--seed", "3", "recipe:Dal (Lentils)", "workout:hiit", "stop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SESSION SUMMARY"))
        .stdout(predicate::str::contains("Dal (Lentils)"))
        .stdout(predicate::str::contains("HIIT Workout stopped"));
}

#[test]
fn test_run_device_steps() {
    let snapshot = run_json(&["run", "--seed", "5", "devices", "connect:2"]);
    let connected = snapshot["devices"]["connected"].as_array().unwrap();
    assert_eq!(connected.len(), 2);
    assert_eq!(connected[1]["name"], "Fitbit Charge 6");
    assert_eq!(snapshot["devices"]["scanning"], false);

    cli()
        .args(["run", "connect:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown device: 1"));
}

#[test]
fn test_run_rejects_bad_step() {
    cli()
        .args(["run", "eat:Naan", "dance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dance"));
}

#[test]
fn test_run_unknown_food_fails() {
    cli()
        .args(["run", "eat:Pizza"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pizza"));
}

#[test]
fn test_config_override_changes_baseline() {
    let (_dir, path) = write_config("[baseline]\nglucose = 100\nsteps = 5000\n");
    let snapshot = run_json(&["run", "--config", path.to_str().unwrap()]);

    assert_eq!(snapshot["physiology"]["glucose"], 100);
    assert_eq!(snapshot["physiology"]["steps"], 5000);
    assert_eq!(snapshot["glucose_status"], "elevated");
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_dir, path) = write_config("[physiology]\nglucose_calorie_divisor = 0\n");
    cli()
        .args(["foods", "--config", path.to_str().unwrap()])
        .assert()
        .failure();
}
