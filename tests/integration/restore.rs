//! Coverage for the `restore`, `restore-dirs`, `rollback`, and `delete`
//! commands.

use super::common::{isolated_command, seed_vendor_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Back up `source` through the binary and return the archive path from the
/// list output.
fn backup_via_cli(home: &Path, vendor: &str, source: &Path) -> PathBuf {
    let status = isolated_command(home)
        .args(["backup", vendor, "--source"])
        .arg(source)
        .status()
        .unwrap();
    assert!(status.success());

    let output = isolated_command(home)
        .args(["list", vendor])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| {
            line.split_whitespace()
                .last()
                .filter(|p| p.ends_with(".tar.gz"))
                .map(PathBuf::from)
        })
        .expect("list output should name the archive")
}

#[test]
fn test_restore_command_into_explicit_dest() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    let archive = backup_via_cli(temp.path(), "gemini", &source);

    let dest = temp.path().join("restored");
    let output = isolated_command(temp.path())
        .args(["restore"])
        .arg(&archive)
        .args(["--dest"])
        .arg(&dest)
        .args(["--no-pre-backup"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dest.join("settings.json").is_file());
    assert!(dest.join("mcp_servers/one.json").is_file());
}

#[test]
fn test_restore_by_vendor_id_uses_latest_backup() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    backup_via_cli(temp.path(), "gemini", &source);

    let dest = temp.path().join("restored");
    let output = isolated_command(temp.path())
        .args(["restore", "gemini", "--dest"])
        .arg(&dest)
        .args(["--no-pre-backup"])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(dest.join("settings.json").is_file());
}

#[test]
fn test_restore_replaces_existing_dest() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    let archive = backup_via_cli(temp.path(), "gemini", &source);

    let dest = temp.path().join("live");
    seed_vendor_dir(&dest);
    fs::write(dest.join("stray.txt"), b"leftover").unwrap();

    let output = isolated_command(temp.path())
        .args(["restore"])
        .arg(&archive)
        .args(["--dest"])
        .arg(&dest)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pre-restore backup:"));
    // Wholesale replacement: files not in the archive are gone.
    assert!(!dest.join("stray.txt").exists());
    assert!(dest.join("settings.json").is_file());
}

#[test]
fn test_restore_preview_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    let archive = backup_via_cli(temp.path(), "gemini", &source);

    let dest = temp.path().join("untouched");
    let output = isolated_command(temp.path())
        .args(["restore"])
        .arg(&archive)
        .args(["--dest"])
        .arg(&dest)
        .args(["--preview"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("settings.json"));
    assert!(!dest.exists());
}

#[test]
fn test_restore_dirs_list_and_selective() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    let archive = backup_via_cli(temp.path(), "gemini", &source);

    let output = isolated_command(temp.path())
        .args(["restore-dirs"])
        .arg(&archive)
        .args(["--list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mcp_servers"));

    // Selective restore only touches the chosen subdirectory.
    let dest = temp.path().join("live");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("settings.json"), b"local edits").unwrap();

    let output = isolated_command(temp.path())
        .args(["restore-dirs"])
        .arg(&archive)
        .args(["mcp_servers", "--dest"])
        .arg(&dest)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fs::read(dest.join("settings.json")).unwrap(), b"local edits");
    assert!(dest.join("mcp_servers/one.json").is_file());
}

#[test]
fn test_rollback_command() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    let pre_restore = backup_via_cli(temp.path(), "gemini", &source);

    // Damage the live tree, then roll back from the earlier backup.
    fs::write(source.join("settings.json"), b"broken").unwrap();

    let output = isolated_command(temp.path())
        .args(["rollback"])
        .arg(&pre_restore)
        .args(["--dest"])
        .arg(&source)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        fs::read(source.join("settings.json")).unwrap(),
        b"{\"model\":\"gemini2\"}\n"
    );
}

#[test]
fn test_delete_command_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);
    let archive = backup_via_cli(temp.path(), "cursor", &source);

    let output = isolated_command(temp.path())
        .args(["delete"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!archive.exists());

    // Second delete of the same path still succeeds.
    let output = isolated_command(temp.path())
        .args(["delete"])
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("already gone"));
}
