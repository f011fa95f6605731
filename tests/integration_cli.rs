//! CLI-level tests for the validate, status, and reset commands.
//!
//! These exercise the binary end to end through `assert_cmd`; nothing here
//! touches the network or a real Python installation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pipmatrix() -> Command {
    Command::cargo_bin("pipmatrix").unwrap()
}

#[test]
fn validate_accepts_well_formed_requirements() {
    let temp = TempDir::new().unwrap();
    let reqs = temp.path().join("requirements.txt");
    std::fs::write(
        &reqs,
        "# pinned and ranged requirements\n\
         requests>=2.0\n\
         uvicorn[standard]==0.23.2\n\
         flask\n\n",
    )
    .unwrap();

    pipmatrix()
        .args(["validate", reqs.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 requirement(s), all lines valid"));
}

#[test]
fn validate_rejects_malformed_lines_with_per_line_errors() {
    let temp = TempDir::new().unwrap();
    let reqs = temp.path().join("requirements.txt");
    std::fs::write(&reqs, "requests>=2.0\n==1.0\nbad name==2\n").unwrap();

    pipmatrix()
        .args(["validate", reqs.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Line 2"))
        .stderr(predicate::str::contains("Line 3"));
}

#[test]
fn validate_fails_on_missing_file() {
    pipmatrix()
        .args(["validate", "/no/such/requirements.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requirements.txt"));
}

#[test]
fn validate_rejects_comment_only_input() {
    let temp = TempDir::new().unwrap();
    let reqs = temp.path().join("requirements.txt");
    std::fs::write(&reqs, "# nothing but comments\n\n").unwrap();

    pipmatrix().args(["validate", reqs.to_str().unwrap()]).assert().failure();
}

#[test]
fn status_reports_fresh_state_when_nothing_persisted() {
    let temp = TempDir::new().unwrap();

    pipmatrix()
        .current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("next run starts fresh"));
}

#[test]
fn status_reports_persisted_ordinal() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("pipmatrix");
    std::fs::create_dir_all(&work_dir).unwrap();
    std::fs::write(work_dir.join("ITERATION_STATE.txt"), "5").unwrap();

    pipmatrix()
        .current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempts completed: 5"))
        .stdout(predicate::str::contains("#6"));
}

#[test]
fn status_honors_explicit_config() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("runs");
    std::fs::create_dir_all(&work_dir).unwrap();
    std::fs::write(work_dir.join("ITERATION_STATE.txt"), "12").unwrap();

    let config = temp.path().join("pipmatrix.toml");
    std::fs::write(&config, format!("work_dir = \"{}\"\n", work_dir.display())).unwrap();

    pipmatrix()
        .args(["--config", config.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempts completed: 12"));
}

#[test]
fn reset_removes_state_and_reports_previous_ordinal() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("pipmatrix");
    std::fs::create_dir_all(&work_dir).unwrap();
    let state = work_dir.join("ITERATION_STATE.txt");
    std::fs::write(&state, "7").unwrap();

    pipmatrix()
        .current_dir(temp.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("ordinal 7"));
    assert!(!state.exists());

    // A second reset is a no-op, not an error.
    pipmatrix()
        .current_dir(temp.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("No iteration state"));
}

#[test]
fn resolve_rejects_invalid_requirements_before_touching_pip() {
    let temp = TempDir::new().unwrap();
    let reqs = temp.path().join("requirements.txt");
    std::fs::write(&reqs, "==1.0\n").unwrap();

    pipmatrix()
        .current_dir(temp.path())
        .args(["resolve", reqs.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed"));
}

#[test]
fn conflicting_verbosity_flags_are_rejected() {
    pipmatrix().args(["--verbose", "--quiet", "status"]).assert().failure();
}
