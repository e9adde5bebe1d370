//! Binary smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn isolated(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cfgvault").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"));
    cmd
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("cfgvault")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cfgvault"));
}

#[test]
fn test_no_subcommand_shows_usage() {
    Command::cargo_bin("cfgvault")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_vendors_lists_known_ids() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .arg("vendors")
        .assert()
        .success()
        .stdout(predicate::str::contains("claude"))
        .stdout(predicate::str::contains("gemini"))
        .stdout(predicate::str::contains("not installed"));
}

#[test]
fn test_verify_missing_archive_fails() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["verify", "/nonexistent/backup.tar.gz"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_backup_all_with_nothing_installed() {
    let home = TempDir::new().unwrap();
    isolated(&home)
        .args(["backup", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to back up"));
}
