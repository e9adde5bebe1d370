use cfgvault::config::Config;
use cfgvault::core::{VaultError, VaultResult};
use std::path::PathBuf;

pub fn run(archive: PathBuf) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::backup_manager(&config)?;

    println!("Verifying {}...", archive.display());
    let (ok, message) = manager.verify_backup(&archive);

    if ok {
        println!("✓ {}", message);
        Ok(())
    } else {
        println!("❌ {}", message);
        Err(VaultError::InvalidArchive(message))
    }
}
