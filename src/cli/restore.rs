use cfgvault::config::Config;
use cfgvault::core::{VaultError, VaultResult};
use cfgvault::progress::SpinnerProgress;
use std::path::PathBuf;

pub fn run(
    archive: PathBuf,
    dest: Option<PathBuf>,
    no_pre_backup: bool,
    preview: bool,
) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::restore_manager(&config)?;
    let archive = super::resolve_archive(&super::backup_manager(&config)?, archive)?;
    let dest_dir = super::resolve_destination(&archive, dest)?;

    if preview {
        return show_preview(&manager, &archive, &dest_dir);
    }

    let progress = SpinnerProgress::new();
    let result = manager.restore_vendor(&archive, &dest_dir, !no_pre_backup, &progress);
    progress.finish();

    if let Some(pre) = &result.pre_restore_backup {
        println!("  Pre-restore backup: {}", pre.display());
    }
    for skipped in &result.skipped_members {
        println!("  ⚠ Skipped unsafe member: {}", skipped);
    }

    if result.success {
        println!(
            "✓ Restored {} file(s) to {}",
            result.restored_files,
            dest_dir.display()
        );
        Ok(())
    } else {
        Err(VaultError::InvalidArchive(
            result.error.unwrap_or_else(|| "restore failed".to_string()),
        ))
    }
}

fn show_preview(
    manager: &cfgvault::restore::RestoreManager,
    archive: &std::path::Path,
    dest_dir: &std::path::Path,
) -> VaultResult<()> {
    let preview = manager
        .preview_restore(archive, dest_dir)
        .ok_or_else(|| {
            VaultError::InvalidArchive(format!("{} is not a readable backup", archive.display()))
        })?;

    println!(
        "Restoring {} would write {} file(s) ({} bytes):",
        archive.display(),
        preview.files_to_restore.len(),
        preview.estimated_bytes
    );
    for file in &preview.files_to_restore {
        let marker = if preview.files_overwritten.contains(file) {
            "overwrite"
        } else {
            "create"
        };
        println!("  {:<9} {}", marker, file.display());
    }
    if !preview.directories_to_create.is_empty() {
        println!("New directories:");
        for dir in &preview.directories_to_create {
            println!("  {}", dir.display());
        }
    }
    Ok(())
}
