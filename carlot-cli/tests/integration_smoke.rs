//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_serve() {
    let mut cmd = Command::cargo_bin("carlot").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("carlot").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--db-host"))
        .stdout(predicate::str::contains("DB_DATABASE"))
        .stdout(predicate::str::contains("--time-zone"));
}

#[test]
fn test_serve_rejects_bad_session_settings() {
    let mut cmd = Command::cargo_bin("carlot").unwrap();
    cmd.arg("serve")
        .arg("--port")
        .arg("0")
        .arg("--sql-mode")
        .arg("TRADITIONAL'; DROP TABLE car")
        .env_remove("RUST_LOG");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid database session settings"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("carlot").unwrap();
    cmd.arg("drive");

    cmd.assert().failure();
}
