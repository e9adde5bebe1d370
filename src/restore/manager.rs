use crate::archive::{ArchiveCodec, ArchiveMember, MemberKind};
use crate::backup::BackupManager;
use crate::core::path::ensure_dir;
use crate::core::{VaultError, VaultResult};
use crate::progress::ProgressSink;
use chrono::Utc;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::warn;

/// Dry-run diff of an archive against a destination directory. Computed on
/// demand, never persisted.
#[derive(Debug, Default)]
pub struct RestorePreview {
    /// Destination-relative file paths the restore would write.
    pub files_to_restore: Vec<PathBuf>,
    /// Subset of `files_to_restore` that already exist at the destination.
    pub files_overwritten: Vec<PathBuf>,
    /// Destination-relative directories that do not exist yet.
    pub directories_to_create: Vec<PathBuf>,
    pub estimated_bytes: u64,
}

/// Outcome of a restore operation.
#[derive(Debug)]
pub struct RestoreResult {
    pub success: bool,
    pub restored_files: usize,
    /// Path of the pre-restore backup, when one was taken.
    pub pre_restore_backup: Option<PathBuf>,
    pub error: Option<String>,
    /// Members dropped by the safety validator during broad extraction.
    pub skipped_members: Vec<String>,
    pub duration: Duration,
}

impl RestoreResult {
    fn failed(error: String, duration: Duration) -> Self {
        Self {
            success: false,
            restored_files: 0,
            pre_restore_backup: None,
            error: Some(error),
            skipped_members: Vec::new(),
            duration,
        }
    }
}

/// Orchestrates restores from backup archives: previews, full restores with
/// optional pre-restore snapshots, selective subdirectory restores, and
/// rollback.
#[derive(Debug, Clone)]
pub struct RestoreManager {
    backups: BackupManager,
    codec: ArchiveCodec,
}

impl RestoreManager {
    pub fn new(backups: BackupManager, codec: ArchiveCodec) -> Self {
        Self { backups, codec }
    }

    /// Read-only preview of what a restore would change. Returns `None` if
    /// the file does not pass basic archive validation.
    pub fn preview_restore(
        &self,
        archive_path: &Path,
        dest_config_dir: &Path,
    ) -> Option<RestorePreview> {
        let members = self.codec.list_members(archive_path).ok()?;
        let root = archive_root(&members)?;

        let mut preview = RestorePreview::default();
        for member in &members {
            let Some(rel) = member_rel_path(member, &root) else {
                continue;
            };
            match member.kind {
                MemberKind::File => {
                    preview.estimated_bytes += member.size;
                    if dest_config_dir.join(&rel).exists() {
                        preview.files_overwritten.push(rel.clone());
                    }
                    preview.files_to_restore.push(rel);
                }
                MemberKind::Directory => {
                    if !dest_config_dir.join(&rel).is_dir() {
                        preview.directories_to_create.push(rel);
                    }
                }
                _ => {}
            }
        }
        Some(preview)
    }

    /// Replace `dest_config_dir` wholesale with the archive's contents.
    ///
    /// The archive is verified first; when `make_pre_restore_backup` is set
    /// and the destination exists, its current state is backed up and that
    /// backup's path recorded in the result. The extracted tree is staged
    /// fully, then swapped into place by rename. There is no automatic
    /// rollback on failure; the pre-restore backup is the recovery path.
    pub fn restore_vendor(
        &self,
        archive_path: &Path,
        dest_config_dir: &Path,
        make_pre_restore_backup: bool,
        progress: &dyn ProgressSink,
    ) -> RestoreResult {
        let started = Instant::now();

        progress.milestone("restore", "validating archive");
        let (valid, message) = self.backups.verify_backup(archive_path);
        if !valid {
            return RestoreResult::failed(message, started.elapsed());
        }

        let vendor_id = self
            .vendor_of(archive_path)
            .or_else(|| {
                dest_config_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "unknown".to_string());

        let mut pre_restore_backup = None;
        if make_pre_restore_backup && dest_config_dir.is_dir() {
            progress.milestone(&vendor_id, "backing up current state");
            // Retention must not prune the archive we are about to restore.
            let result = self.backups.backup_vendor_preserving(
                &vendor_id,
                dest_config_dir,
                archive_path,
                progress,
            );
            match result.metadata {
                Some(meta) if result.success => pre_restore_backup = Some(meta.backup_path),
                _ => {
                    return RestoreResult::failed(
                        format!(
                            "pre-restore backup failed: {}",
                            result.error.unwrap_or_default()
                        ),
                        started.elapsed(),
                    );
                }
            }
        }

        match self.extract_and_swap(archive_path, dest_config_dir, &vendor_id, progress) {
            Ok((restored_files, skipped_members)) => RestoreResult {
                success: true,
                restored_files,
                pre_restore_backup,
                error: None,
                skipped_members,
                duration: started.elapsed(),
            },
            Err(e) => {
                let mut result = RestoreResult::failed(e.to_string(), started.elapsed());
                result.pre_restore_backup = pre_restore_backup;
                result
            }
        }
    }

    fn extract_and_swap(
        &self,
        archive_path: &Path,
        dest_config_dir: &Path,
        vendor_id: &str,
        progress: &dyn ProgressSink,
    ) -> VaultResult<(usize, Vec<String>)> {
        let staging = staging_dir(dest_config_dir, vendor_id)?;

        progress.milestone(vendor_id, "extracting archive");
        let unpacked = match self.codec.unpack_all(archive_path, &staging) {
            Ok(unpacked) => unpacked,
            Err(e) => {
                let _ = fs::remove_dir_all(&staging);
                return Err(e);
            }
        };

        let staged_root = staging.join(vendor_id);
        if !staged_root.is_dir() {
            let _ = fs::remove_dir_all(&staging);
            return Err(VaultError::InvalidArchive(format!(
                "archive has no usable root entry '{}'",
                vendor_id
            )));
        }

        progress.milestone(vendor_id, "replacing destination");
        let swap = replace_dir(&staged_root, dest_config_dir);
        let _ = fs::remove_dir_all(&staging);
        swap?;

        Ok((unpacked.extracted.len(), unpacked.skipped))
    }

    /// Restore only the named subdirectories of the archive's root entry.
    ///
    /// A requested name absent from the archive is reported and skipped,
    /// per name. A traversal attempt in the targeted extraction aborts the
    /// whole call: the caller explicitly chose members, so a security
    /// violation is never downgraded to partial success.
    pub fn restore_selective(
        &self,
        archive_path: &Path,
        dest_config_dir: &Path,
        subdirectory_names: &[String],
        progress: &dyn ProgressSink,
    ) -> RestoreResult {
        let started = Instant::now();

        progress.milestone("restore", "validating archive");
        let (valid, message) = self.backups.verify_backup(archive_path);
        if !valid {
            return RestoreResult::failed(message, started.elapsed());
        }
        let members = match self.codec.list_members(archive_path) {
            Ok(members) => members,
            Err(e) => return RestoreResult::failed(e.to_string(), started.elapsed()),
        };
        let Some(root) = archive_root(&members) else {
            return RestoreResult::failed("archive has no root entry".to_string(), started.elapsed());
        };

        let mut restored_files = 0;
        let mut notes = Vec::new();

        for name in subdirectory_names {
            let prefix = format!("{}/{}", root, name);
            let chosen: Vec<String> = members
                .iter()
                .map(|m| m.name.trim_end_matches('/').to_string())
                .filter(|n| *n == prefix || n.starts_with(&format!("{}/", prefix)))
                .collect();
            if chosen.is_empty() {
                warn!(subdirectory = %name, "not present in archive, skipping");
                notes.push(format!("subdirectory not in archive: {}", name));
                continue;
            }

            progress.milestone(name, "extracting subdirectory");
            let staging = match staging_dir(dest_config_dir, name) {
                Ok(staging) => staging,
                Err(e) => return RestoreResult::failed(e.to_string(), started.elapsed()),
            };
            match self.codec.unpack_selected(archive_path, &staging, &chosen) {
                Ok(extracted) => {
                    let staged_sub = staging.join(&root).join(name);
                    let swap = if staged_sub.is_dir() {
                        replace_dir(&staged_sub, &dest_config_dir.join(name))
                    } else {
                        Err(VaultError::InvalidArchive(format!(
                            "no staged tree for subdirectory {}",
                            name
                        )))
                    };
                    let _ = fs::remove_dir_all(&staging);
                    match swap {
                        Ok(()) => restored_files += extracted.len(),
                        Err(e) => notes.push(format!("{}: {}", name, e)),
                    }
                }
                Err(e @ VaultError::UnsafeArchiveMember(_)) => {
                    let _ = fs::remove_dir_all(&staging);
                    return RestoreResult::failed(e.to_string(), started.elapsed());
                }
                Err(e) => {
                    let _ = fs::remove_dir_all(&staging);
                    notes.push(format!("{}: {}", name, e));
                }
            }
        }

        RestoreResult {
            success: true,
            restored_files,
            pre_restore_backup: None,
            error: if notes.is_empty() {
                None
            } else {
                Some(notes.join("; "))
            },
            skipped_members: Vec::new(),
            duration: started.elapsed(),
        }
    }

    /// Restore a previously taken pre-restore backup without chaining a new
    /// backup of the (presumably broken) current state.
    pub fn rollback(
        &self,
        pre_restore_backup_path: &Path,
        dest_config_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> RestoreResult {
        self.restore_vendor(pre_restore_backup_path, dest_config_dir, false, progress)
    }

    /// Unique top-level subdirectory names under the archive's root entry.
    pub fn get_restorable_directories(&self, archive_path: &Path) -> VaultResult<Vec<String>> {
        let members = self.codec.list_members(archive_path)?;
        let Some(root) = archive_root(&members) else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for member in &members {
            let Some(rel) = member_rel_path(member, &root) else {
                continue;
            };
            let mut components = rel.components();
            let Some(Component::Normal(first)) = components.next() else {
                continue;
            };
            let is_subdir =
                components.next().is_some() || member.kind == MemberKind::Directory;
            if is_subdir {
                let name = first.to_string_lossy().into_owned();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn vendor_of(&self, archive_path: &Path) -> Option<String> {
        let members = self.codec.list_members(archive_path).ok()?;
        archive_root(&members)
    }
}

/// Name of the archive's single top-level entry.
fn archive_root(members: &[ArchiveMember]) -> Option<String> {
    let first = members.first()?;
    let component = Path::new(&first.name).components().next()?;
    match component {
        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Member path relative to the archive root entry; `None` for the root
/// entry itself or members outside it.
fn member_rel_path(member: &ArchiveMember, root: &str) -> Option<PathBuf> {
    let rel = Path::new(&member.name).strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        None
    } else {
        Some(rel.to_path_buf())
    }
}

/// Private staging location beside the destination, so the final swap is a
/// same-filesystem rename.
fn staging_dir(dest: &Path, label: &str) -> VaultResult<PathBuf> {
    let parent = dest
        .parent()
        .ok_or_else(|| VaultError::Path(format!("{} has no parent", dest.display())))?;
    ensure_dir(parent)?;
    let staging = parent.join(format!(
        ".cfgvault-staging-{}-{}",
        label,
        Utc::now().format("%Y%m%d%H%M%S%f")
    ));
    ensure_dir(&staging)?;
    Ok(staging)
}

/// Swap a fully staged tree into place. The destination is moved aside,
/// the staged tree renamed in, and the displaced tree removed; the
/// destination is only ever absent between the two renames.
fn replace_dir(staged: &Path, dest: &Path) -> VaultResult<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }

    let displaced = if dest.exists() {
        let old = dest.with_file_name(format!(
            ".{}.old-{}",
            dest.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "dir".to_string()),
            Utc::now().format("%Y%m%d%H%M%S%f")
        ));
        fs::rename(dest, &old)?;
        Some(old)
    } else {
        None
    };

    if let Err(e) = fs::rename(staged, dest) {
        if let Some(old) = &displaced {
            let _ = fs::rename(old, dest);
        }
        return Err(e.into());
    }

    if let Some(old) = displaced {
        if let Err(e) = fs::remove_dir_all(&old) {
            warn!(path = %old.display(), error = %e, "could not remove displaced tree");
        }
    }
    Ok(())
}
