use cfgvault::config::Config;
use cfgvault::core::{VaultError, VaultResult};
use cfgvault::progress::SpinnerProgress;
use std::path::PathBuf;

pub fn run(archive: PathBuf, dest: Option<PathBuf>) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::restore_manager(&config)?;
    let dest_dir = super::resolve_destination(&archive, dest)?;

    println!(
        "Rolling back {} from {}",
        dest_dir.display(),
        archive.display()
    );

    let progress = SpinnerProgress::new();
    let result = manager.rollback(&archive, &dest_dir, &progress);
    progress.finish();

    if result.success {
        println!("✓ Rolled back {} file(s)", result.restored_files);
        Ok(())
    } else {
        Err(VaultError::InvalidArchive(
            result.error.unwrap_or_else(|| "rollback failed".to_string()),
        ))
    }
}
