use cfgvault::config::Config;
use cfgvault::core::{VaultError, VaultResult};
use cfgvault::progress::SpinnerProgress;
use std::path::PathBuf;

pub fn run(
    archive: PathBuf,
    names: Vec<String>,
    dest: Option<PathBuf>,
    list_only: bool,
) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::restore_manager(&config)?;

    if list_only {
        let dirs = manager.get_restorable_directories(&archive)?;
        if dirs.is_empty() {
            println!("Archive contains no restorable subdirectories");
        } else {
            println!("Restorable subdirectories:");
            for dir in dirs {
                println!("  {}", dir);
            }
        }
        return Ok(());
    }

    if names.is_empty() {
        return Err(VaultError::Config(
            "specify subdirectory names to restore, or pass --list".to_string(),
        ));
    }

    let dest_dir = super::resolve_destination(&archive, dest)?;
    let progress = SpinnerProgress::new();
    let result = manager.restore_selective(&archive, &dest_dir, &names, &progress);
    progress.finish();

    if result.success {
        println!(
            "✓ Restored {} file(s) from {} subdirectorie(s)",
            result.restored_files,
            names.len()
        );
        // Non-fatal notes (e.g. names absent from the archive).
        if let Some(notes) = &result.error {
            println!("  ⚠ {}", notes);
        }
        Ok(())
    } else {
        Err(VaultError::InvalidArchive(
            result.error.unwrap_or_else(|| "restore failed".to_string()),
        ))
    }
}
