use cfgvault::archive::ArchiveCodec;
use cfgvault::backup::BackupManager;
use cfgvault::config::Config;
use cfgvault::core::{VaultError, VaultResult};
use cfgvault::restore::RestoreManager;
use std::path::{Path, PathBuf};

pub mod backup;
pub mod delete;
pub mod list;
pub mod restore;
pub mod restore_dirs;
pub mod rollback;
pub mod vendors;
pub mod verify;

/// Build the backup manager from the loaded config.
pub fn backup_manager(config: &Config) -> VaultResult<BackupManager> {
    let codec = ArchiveCodec::new(config.compression_level);
    BackupManager::new(config.backup_root()?, config.retention_count, codec)
}

/// Build the restore manager from the loaded config.
pub fn restore_manager(config: &Config) -> VaultResult<RestoreManager> {
    let codec = ArchiveCodec::new(config.compression_level);
    Ok(RestoreManager::new(backup_manager(config)?, codec))
}

/// Vendor id encoded in an archive file name
/// (`<vendor>_backup_<timestamp>.tar.gz`).
pub fn vendor_from_archive_name(archive_path: &Path) -> Option<String> {
    let name = archive_path.file_name()?.to_str()?;
    let (vendor, _) = name.split_once("_backup_")?;
    if vendor.is_empty() {
        None
    } else {
        Some(vendor.to_string())
    }
}

/// Accept either an archive path or a bare vendor id; a vendor id resolves
/// to that vendor's newest backup.
pub fn resolve_archive(manager: &BackupManager, arg: PathBuf) -> VaultResult<PathBuf> {
    if arg.is_file() {
        return Ok(arg);
    }
    let Some(vendor) = arg.to_str().filter(|s| !s.contains(std::path::MAIN_SEPARATOR)) else {
        return Ok(arg);
    };
    match manager.get_latest_backup(vendor)? {
        Some(meta) => Ok(meta.backup_path),
        None => Err(VaultError::Path(format!(
            "no backup archive at '{}' and no backups recorded for that vendor",
            arg.display()
        ))),
    }
}

/// Destination directory for a restore: explicit path, or the vendor's
/// default config directory derived from the archive name.
pub fn resolve_destination(
    archive_path: &Path,
    explicit: Option<std::path::PathBuf>,
) -> VaultResult<std::path::PathBuf> {
    if let Some(dest) = explicit {
        return Ok(dest);
    }
    let vendor = vendor_from_archive_name(archive_path).ok_or_else(|| {
        VaultError::Path(format!(
            "cannot infer vendor from archive name '{}'; pass --dest",
            archive_path.display()
        ))
    })?;
    cfgvault::vendors::resolve(&vendor).ok_or_else(|| {
        VaultError::Path(format!(
            "unknown vendor '{}' and no --dest given",
            vendor
        ))
    })
}
