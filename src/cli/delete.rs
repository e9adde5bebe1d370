use cfgvault::config::Config;
use cfgvault::core::VaultResult;
use std::path::PathBuf;

pub fn run(archive: PathBuf) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::backup_manager(&config)?;

    if manager.delete_backup(&archive)? {
        println!("✓ Deleted {}", archive.display());
    } else {
        println!("{} was already gone", archive.display());
    }
    Ok(())
}
