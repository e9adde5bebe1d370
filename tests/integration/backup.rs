//! End-to-end backup coverage: library managers plus the `backup`, `list`,
//! and `verify` commands.

use super::common::{isolated_command, seed_vendor_dir};
use cfgvault::archive::ArchiveCodec;
use cfgvault::backup::BackupManager;
use cfgvault::progress::NullProgress;
use cfgvault::restore::RestoreManager;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_backup_and_restore_round_trip() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join(".gemini");
    seed_vendor_dir(&source);

    let backups = BackupManager::new(
        temp.path().join("backups"),
        5,
        ArchiveCodec::default(),
    )
    .unwrap();

    let result = backups.backup_vendor("gemini", &source, &NullProgress);
    assert!(result.success, "{:?}", result.error);
    let meta = result.metadata.unwrap();
    assert_eq!(meta.file_count, 2);
    assert_eq!(meta.checksum.len(), 64);
    assert!(meta.checksum.chars().all(|c| c.is_ascii_hexdigit()));
    let name = meta.backup_path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("gemini_backup_"));
    assert!(name.ends_with(".tar.gz"));

    // Restore into a fresh location and compare contents.
    let dest = temp.path().join("restored");
    let restorer = RestoreManager::new(backups, ArchiveCodec::default());
    let restored = restorer.restore_vendor(&meta.backup_path, &dest, false, &NullProgress);
    assert!(restored.success, "{:?}", restored.error);
    assert_eq!(restored.restored_files, 2);
    assert_eq!(
        fs::read(dest.join("settings.json")).unwrap(),
        fs::read(source.join("settings.json")).unwrap()
    );
    assert_eq!(
        fs::read(dest.join("mcp_servers/one.json")).unwrap(),
        fs::read(source.join("mcp_servers/one.json")).unwrap()
    );
}

#[test]
fn test_backup_command_with_custom_source() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);

    let output = isolated_command(temp.path())
        .args(["backup", "gemini", "--source"])
        .arg(&source)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Backed up gemini"));
    assert!(stdout.contains("2 files"));
}

#[test]
fn test_backup_command_unknown_vendor_fails() {
    let temp = TempDir::new().unwrap();

    let output = isolated_command(temp.path())
        .args(["backup", "vim"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown vendor"));
}

#[test]
fn test_backup_missing_vendor_dir_fails_cleanly() {
    let temp = TempDir::new().unwrap();

    let output = isolated_command(temp.path())
        .args(["backup", "gemini", "--source"])
        .arg(temp.path().join("does-not-exist"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    // Surfaced as a backup failure, not a configuration problem.
    assert!(stderr.contains("Backup failed"));
    assert!(stderr.contains("not installed"));
}

#[test]
fn test_list_and_verify_commands() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);

    let status = isolated_command(temp.path())
        .args(["backup", "codex", "--source"])
        .arg(&source)
        .status()
        .unwrap();
    assert!(status.success());

    let output = isolated_command(temp.path())
        .args(["list", "codex"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 backup(s)"));
    assert!(stdout.contains("codex"));

    // Pull the archive path out of the list output and verify it.
    let archive = stdout
        .lines()
        .find_map(|line| {
            line.split_whitespace()
                .last()
                .filter(|p| p.ends_with(".tar.gz"))
        })
        .expect("list output should name the archive");

    let output = isolated_command(temp.path())
        .args(["verify", archive])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("valid archive"));
}

#[test]
fn test_list_empty_root() {
    let temp = TempDir::new().unwrap();

    let output = isolated_command(temp.path()).arg("list").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No backups found"));
}

#[test]
fn test_verify_detects_corruption() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("cfg");
    seed_vendor_dir(&source);

    let backups = BackupManager::new(
        temp.path().join("backups"),
        5,
        ArchiveCodec::default(),
    )
    .unwrap();
    let meta = backups
        .backup_vendor("aider", &source, &NullProgress)
        .metadata
        .unwrap();

    let mut bytes = fs::read(&meta.backup_path).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xff;
    fs::write(&meta.backup_path, &bytes).unwrap();

    let output = isolated_command(temp.path())
        .args(["verify"])
        .arg(&meta.backup_path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("checksum mismatch"));
}
