use cfgvault::config::Config;
use cfgvault::core::{VaultError, VaultResult};
use cfgvault::progress::SpinnerProgress;
use cfgvault::vendors::{self, format_size};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn run(vendor: Option<String>, all: bool, source: Option<PathBuf>) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::backup_manager(&config)?;
    let progress = SpinnerProgress::new();

    if all {
        let installed: BTreeMap<String, PathBuf> = vendors::installed().into_iter().collect();
        if installed.is_empty() {
            println!("No supported CLI configurations found. Nothing to back up.");
            return Ok(());
        }

        println!("Backing up {} vendor(s)...", installed.len());
        let summary = manager.backup_all(&installed, &progress);
        progress.finish();

        for result in &summary.results {
            match (&result.metadata, &result.error) {
                (Some(meta), _) => println!(
                    "✓ {}: {} ({}, {} files)",
                    result.vendor_id,
                    meta.backup_path.display(),
                    format_size(meta.size_bytes),
                    meta.file_count
                ),
                (None, Some(error)) => println!("❌ {}: {}", result.vendor_id, error),
                (None, None) => println!("❌ {}: unknown failure", result.vendor_id),
            }
        }
        println!(
            "\n{} succeeded, {} failed, {} written",
            summary.succeeded,
            summary.failed,
            format_size(summary.total_bytes)
        );

        if summary.failed > 0 {
            return Err(VaultError::Backup(format!(
                "{} vendor(s) failed",
                summary.failed
            )));
        }
        return Ok(());
    }

    let vendor = vendor.ok_or_else(|| {
        VaultError::Config("specify a vendor to back up, or pass --all".to_string())
    })?;

    let source_dir = match source {
        Some(dir) => dir,
        None => vendors::resolve(&vendor).ok_or_else(|| {
            VaultError::Config(format!(
                "unknown vendor '{}'; pass --source to back up a custom directory",
                vendor
            ))
        })?,
    };

    let result = manager.backup_vendor(&vendor, &source_dir, &progress);
    progress.finish();

    match (result.metadata, result.error) {
        (Some(meta), _) => {
            println!("✓ Backed up {} to {}", vendor, meta.backup_path.display());
            println!(
                "  {} files, {}, sha256 {}",
                meta.file_count,
                format_size(meta.size_bytes),
                meta.checksum
            );
            Ok(())
        }
        (None, error) => Err(VaultError::Backup(
            error.unwrap_or_else(|| "unknown failure".to_string()),
        )),
    }
}
