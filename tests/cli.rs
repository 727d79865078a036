//! Integration tests for the fir binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fir() -> Command {
    let mut cmd = Command::cargo_bin("fir").unwrap();
    cmd.env_remove("DEBUG");
    cmd
}

/// No command at all shows the index
#[test]
fn test_no_arguments_shows_index() {
    fir()
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("fir build_ipa"));
}

#[test]
fn test_help_mappings() {
    for flag in ["-h", "--help", "-?", "-D"] {
        fir()
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains("Commands:"));
    }
}

#[test]
fn test_help_for_command() {
    fir()
        .args(["help", "ba"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:\n  fir build_apk"));
}

/// Asking a command for help halts it before it runs
#[test]
fn test_command_help_flag_halts() {
    fir()
        .args(["bi", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xcodebuild"));
}

#[test]
fn test_unknown_command() {
    fir()
        .arg("xyz")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Could not find command \"xyz\"."));
}

/// An unknown command is reported before the logfile is opened
#[test]
fn test_unknown_command_does_not_create_logfile() {
    let temp_dir = TempDir::new().unwrap();
    let logfile = temp_dir.path().join("x.log");

    fir()
        .args(["xyz", "-L"])
        .arg(&logfile)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Could not find command \"xyz\"."));

    assert!(!logfile.exists());
}

#[test]
fn test_repeated_flag_accepted() {
    fir().args(["version", "-q", "-q"]).assert().success().stdout("");
}

#[test]
fn test_option_of_other_command_rejected() {
    fir().args(["ba", "-S", "foo"]).assert().code(2);
}

#[test]
fn test_missing_required_argument() {
    fir()
        .arg("publish")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn test_version_aliases() {
    for alias in ["version", "v", "-v", "--version"] {
        fir()
            .arg(alias)
            .assert()
            .success()
            .stdout(predicate::str::contains("fir-cli"));
    }
}

#[test]
fn test_quiet_suppresses_output() {
    fir().args(["version", "-q"]).assert().success().stdout("");
}

#[test]
fn test_logfile_receives_output() {
    let temp_dir = TempDir::new().unwrap();
    let logfile = temp_dir.path().join("fir.log");

    fir()
        .args(["version", "-L"])
        .arg(&logfile)
        .assert()
        .success()
        .stdout(predicate::str::contains("fir-cli").not());

    let content = fs::read_to_string(&logfile).unwrap();
    assert!(content.contains("fir-cli"));
}

/// Without a linked service client, remote commands fail
#[test]
fn test_remote_command_fails_offline() {
    fir()
        .args(["me", "-T", "token"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("unavailable"));
}

/// The debug toggle does not stop the command from running
#[test]
fn test_debug_env_still_runs_command() {
    fir()
        .arg("version")
        .env("DEBUG", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("fir-cli"));
}
