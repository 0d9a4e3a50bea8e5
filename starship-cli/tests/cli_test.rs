use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn starship() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("starship")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn test_analyze_prints_result_json() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("app.py"), "def main():\n    return 0\n")?;

    let output = starship()?
        .args(["analyze", "--compact", "--log-level", "error"])
        .arg(dir.path())
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["files_analyzed"], 1);
    assert_eq!(value["modules"][0]["id"], ".");
    assert_eq!(value["modules"][0]["type"], "core");
    assert!(value["details"]["complexity"].is_object());
    assert!(value["metrics"]["overall_health"].is_number());
    Ok(())
}

#[test]
fn test_no_details_and_output_file() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("lib.py"), "x = 1\n")?;
    let out = dir.path().join("result.json");

    starship()?
        .args(["analyze", "--no-details", "--log-level", "error", "--output"])
        .arg(&out)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert!(value.get("details").is_none());
    Ok(())
}

#[test]
fn test_missing_root_fails() -> TestResult {
    starship()?
        .args(["analyze", "/definitely/not/a/starship/tree"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    Ok(())
}

#[test]
fn test_invalid_config_file_fails() -> TestResult {
    let dir = tempdir()?;
    let config = dir.path().join("starship.toml");
    fs::write(&config, "most_imported_limit = 0\n")?;

    starship()?
        .args(["dependencies", "--config"])
        .arg(&config)
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
    Ok(())
}

#[test]
fn test_yagni_subcommand_reports_dead_code() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("m.py"), "def unused():\n    pass\n")?;

    starship()?
        .args(["yagni", "--log-level", "error"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("m.py:unused"));
    Ok(())
}

#[test]
fn test_include_tests_flag() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("test_app.py"), "def test_x():\n    pass\n")?;

    let output = starship()?
        .args(["structure", "--include-tests", "--compact", "--log-level", "error"])
        .arg(dir.path())
        .output()?;
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["total_files"], 1);
    Ok(())
}
