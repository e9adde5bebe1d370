use crate::archive::{ArchiveCodec, MemberKind};
use crate::backup::metadata::{BackupMetadata, VendorManifest};
use crate::core::path::ensure_dir;
use crate::core::{VaultError, VaultResult};
use crate::progress::ProgressSink;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of one vendor backup. Failures are carried here instead of being
/// propagated, so one vendor cannot abort a batch run.
#[derive(Debug)]
pub struct BackupResult {
    pub vendor_id: String,
    pub success: bool,
    pub metadata: Option<BackupMetadata>,
    pub error: Option<String>,
    pub duration: Duration,
}

impl BackupResult {
    fn succeeded(vendor_id: &str, metadata: BackupMetadata, duration: Duration) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            success: true,
            metadata: Some(metadata),
            error: None,
            duration,
        }
    }

    fn failed(vendor_id: &str, error: String, duration: Duration) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            success: false,
            metadata: None,
            error: Some(error),
            duration,
        }
    }
}

/// Aggregate outcome of a multi-vendor backup run.
#[derive(Debug, Default)]
pub struct BackupSummary {
    pub results: Vec<BackupResult>,
    pub succeeded: usize,
    pub failed: usize,
    pub total_bytes: u64,
}

/// Orchestrates per-vendor backups: archive creation, checksum computation,
/// manifest persistence, retention pruning, listing, verification, deletion.
///
/// Owns every manifest file under its backup root; no other component
/// writes them.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_root: PathBuf,
    retention_count: usize,
    codec: ArchiveCodec,
}

pub const DEFAULT_RETENTION: usize = 5;

impl BackupManager {
    /// Create a manager rooted at `backup_root`, keeping `retention_count`
    /// backups per vendor. A retention count of zero is a caller bug and
    /// fails fast instead of being wrapped in a result object.
    pub fn new(
        backup_root: PathBuf,
        retention_count: usize,
        codec: ArchiveCodec,
    ) -> VaultResult<Self> {
        if retention_count == 0 {
            return Err(VaultError::Config(
                "retention count must be at least 1".to_string(),
            ));
        }
        ensure_dir(&backup_root)?;
        Ok(Self {
            backup_root,
            retention_count,
            codec,
        })
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn vendor_dir(&self, vendor_id: &str) -> PathBuf {
        self.backup_root.join(vendor_id)
    }

    /// Back up one vendor's configuration directory.
    ///
    /// Never propagates an error: every failure is folded into the returned
    /// `BackupResult` so batch runs continue past it.
    pub fn backup_vendor(
        &self,
        vendor_id: &str,
        source_config_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> BackupResult {
        let started = Instant::now();
        match self.try_backup(vendor_id, source_config_dir, progress, None) {
            Ok(metadata) => BackupResult::succeeded(vendor_id, metadata, started.elapsed()),
            Err(e) => {
                warn!(vendor = vendor_id, error = %e, "backup failed");
                BackupResult::failed(vendor_id, e.to_string(), started.elapsed())
            }
        }
    }

    /// Like `backup_vendor`, but the archive at `preserve` is exempt from
    /// retention pruning. Used for pre-restore snapshots, where pruning the
    /// archive about to be restored would destroy it.
    pub fn backup_vendor_preserving(
        &self,
        vendor_id: &str,
        source_config_dir: &Path,
        preserve: &Path,
        progress: &dyn ProgressSink,
    ) -> BackupResult {
        let started = Instant::now();
        match self.try_backup(vendor_id, source_config_dir, progress, Some(preserve)) {
            Ok(metadata) => BackupResult::succeeded(vendor_id, metadata, started.elapsed()),
            Err(e) => {
                warn!(vendor = vendor_id, error = %e, "backup failed");
                BackupResult::failed(vendor_id, e.to_string(), started.elapsed())
            }
        }
    }

    fn try_backup(
        &self,
        vendor_id: &str,
        source_config_dir: &Path,
        progress: &dyn ProgressSink,
        preserve: Option<&Path>,
    ) -> VaultResult<BackupMetadata> {
        progress.milestone(vendor_id, "validating");
        if !source_config_dir.is_dir() {
            return Err(VaultError::NotInstalled(format!(
                "{} is not installed: {} does not exist",
                vendor_id,
                source_config_dir.display()
            )));
        }

        let vendor_dir = self.vendor_dir(vendor_id);
        ensure_dir(&vendor_dir)?;
        let mut manifest = VendorManifest::load(&vendor_dir, vendor_id)?;
        let timestamp = Utc::now();
        let archive_path =
            unique_archive_path(&vendor_dir, vendor_id, &timestamp, &manifest.backups);

        progress.milestone(vendor_id, "creating archive");
        if let Err(e) = self.codec.pack(source_config_dir, vendor_id, &archive_path) {
            // Don't leave a partial archive behind.
            let _ = fs::remove_file(&archive_path);
            return Err(e);
        }

        progress.milestone(vendor_id, "computing checksum");
        let checksum = compute_checksum(&archive_path)?;
        let size_bytes = fs::metadata(&archive_path)?.len();
        let file_count = self
            .codec
            .list_members(&archive_path)?
            .iter()
            .filter(|m| m.kind == MemberKind::File)
            .count();

        let metadata = BackupMetadata {
            vendor_id: vendor_id.to_string(),
            timestamp,
            backup_path: archive_path,
            size_bytes,
            checksum,
            file_count,
            config_dir: source_config_dir.display().to_string(),
        };

        progress.milestone(vendor_id, "updating manifest");
        manifest.backups.push(metadata.clone());

        progress.milestone(vendor_id, "applying retention");
        self.apply_retention(&mut manifest, preserve);
        manifest.save(&vendor_dir)?;

        Ok(metadata)
    }

    /// Drop manifest entries (and their archive files) beyond the retention
    /// count, newest first. The manifest is left sorted newest-first. An
    /// archive named in `preserve` is never pruned.
    fn apply_retention(&self, manifest: &mut VendorManifest, preserve: Option<&Path>) {
        manifest
            .backups
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if manifest.backups.len() <= self.retention_count {
            return;
        }
        for old in manifest.backups.split_off(self.retention_count) {
            if preserve.is_some_and(|p| old.backup_path == p) {
                manifest.backups.push(old);
                continue;
            }
            debug!(path = %old.backup_path.display(), "pruning expired backup");
            if let Err(e) = fs::remove_file(&old.backup_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %old.backup_path.display(), error = %e, "failed to prune backup");
                }
            }
        }
    }

    /// Back up several vendors sequentially, continuing past individual
    /// failures.
    pub fn backup_all(
        &self,
        vendors: &BTreeMap<String, PathBuf>,
        progress: &dyn ProgressSink,
    ) -> BackupSummary {
        let mut summary = BackupSummary::default();
        for (vendor_id, source_dir) in vendors {
            let result = self.backup_vendor(vendor_id, source_dir, progress);
            if result.success {
                summary.succeeded += 1;
                if let Some(meta) = &result.metadata {
                    summary.total_bytes += meta.size_bytes;
                }
            } else {
                summary.failed += 1;
            }
            summary.results.push(result);
        }
        summary
    }

    /// List backups for one vendor, or for all vendors under the root.
    ///
    /// Manifest entries whose archive file has gone missing are skipped
    /// silently (stale-entry tolerance). Sorted newest-first.
    pub fn list_backups(&self, vendor_id: Option<&str>) -> VaultResult<Vec<BackupMetadata>> {
        let mut backups = Vec::new();
        match vendor_id {
            Some(vendor) => self.collect_vendor_backups(vendor, &mut backups)?,
            None => {
                if self.backup_root.is_dir() {
                    for entry in fs::read_dir(&self.backup_root)? {
                        let entry = entry?;
                        if !entry.file_type()?.is_dir() {
                            continue;
                        }
                        let vendor = entry.file_name().to_string_lossy().into_owned();
                        self.collect_vendor_backups(&vendor, &mut backups)?;
                    }
                }
            }
        }
        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    fn collect_vendor_backups(
        &self,
        vendor_id: &str,
        out: &mut Vec<BackupMetadata>,
    ) -> VaultResult<()> {
        let vendor_dir = self.vendor_dir(vendor_id);
        if !vendor_dir.is_dir() {
            return Ok(());
        }
        let manifest = VendorManifest::load(&vendor_dir, vendor_id)?;
        for backup in manifest.backups {
            if backup.backup_path.exists() {
                out.push(backup);
            } else {
                debug!(path = %backup.backup_path.display(), "skipping stale manifest entry");
            }
        }
        Ok(())
    }

    pub fn get_latest_backup(&self, vendor_id: &str) -> VaultResult<Option<BackupMetadata>> {
        Ok(self.list_backups(Some(vendor_id))?.into_iter().next())
    }

    /// Check that an archive exists, parses, has members, and (when a
    /// manifest entry records one) still matches its checksum.
    pub fn verify_backup(&self, archive_path: &Path) -> (bool, String) {
        if !archive_path.is_file() {
            return (false, "backup file not found".to_string());
        }

        // Check integrity against the manifest before parsing: a corrupted
        // archive should report as a checksum mismatch, not a format error.
        if let Some(expected) = self.recorded_checksum(archive_path) {
            match compute_checksum(archive_path) {
                Ok(actual) if actual != expected => {
                    return (false, "checksum mismatch".to_string());
                }
                Ok(_) => {}
                Err(e) => return (false, format!("could not read archive: {}", e)),
            }
        }

        match self.codec.list_members(archive_path) {
            Ok(members) if members.is_empty() => {
                (false, "archive contains no members".to_string())
            }
            Ok(members) => (true, format!("valid archive with {} members", members.len())),
            Err(e) => (false, format!("not a recognized archive: {}", e)),
        }
    }

    fn recorded_checksum(&self, archive_path: &Path) -> Option<String> {
        let vendor_dir = archive_path.parent()?;
        let vendor_id = vendor_dir.file_name()?.to_string_lossy().into_owned();
        let manifest = VendorManifest::load(vendor_dir, &vendor_id).ok()?;
        manifest
            .entry_for(archive_path)
            .map(|m| m.checksum.clone())
    }

    /// Remove an archive file and its manifest entry. Returns `false` if
    /// the file was already absent (idempotent no-op).
    pub fn delete_backup(&self, archive_path: &Path) -> VaultResult<bool> {
        if !archive_path.exists() {
            return Ok(false);
        }
        fs::remove_file(archive_path)?;

        if let Some(vendor_dir) = archive_path.parent() {
            if let Some(vendor_id) = vendor_dir.file_name() {
                let vendor_id = vendor_id.to_string_lossy();
                let mut manifest = VendorManifest::load(vendor_dir, &vendor_id)?;
                let before = manifest.backups.len();
                manifest.backups.retain(|b| b.backup_path != archive_path);
                if manifest.backups.len() != before {
                    manifest.save(vendor_dir)?;
                }
            }
        }
        Ok(true)
    }
}

/// Timestamped archive path, disambiguated if two backups land in the same
/// second. The suffix counter advances past every name seen on disk *or*
/// in the manifest, so a name freed by retention pruning is not handed out
/// again while sibling backups from the same second survive.
fn unique_archive_path(
    vendor_dir: &Path,
    vendor_id: &str,
    timestamp: &chrono::DateTime<Utc>,
    recorded: &[BackupMetadata],
) -> PathBuf {
    let prefix = format!("{}_backup_{}", vendor_id, timestamp.format("%Y%m%d_%H%M%S"));

    let mut names: Vec<String> = recorded
        .iter()
        .filter_map(|b| b.backup_path.file_name()?.to_str().map(str::to_string))
        .collect();
    if let Ok(entries) = fs::read_dir(vendor_dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }

    match next_suffix(&names, &prefix) {
        0 => vendor_dir.join(format!("{}.tar.gz", prefix)),
        n => vendor_dir.join(format!("{}_{}.tar.gz", prefix, n)),
    }
}

/// First unused suffix for `prefix` (0 means the bare name is free).
fn next_suffix(names: &[String], prefix: &str) -> u32 {
    let mut next = 0;
    for name in names {
        let Some(rest) = name.strip_prefix(prefix) else {
            continue;
        };
        if rest == ".tar.gz" {
            next = next.max(1);
        } else if let Some(n) = rest
            .strip_prefix('_')
            .and_then(|r| r.strip_suffix(".tar.gz"))
            .and_then(|r| r.parse::<u32>().ok())
        {
            next = next.max(n + 1);
        }
    }
    next
}

/// Streamed SHA-256 over the archive bytes; memory use is independent of
/// archive size.
pub fn compute_checksum(path: &Path) -> VaultResult<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
