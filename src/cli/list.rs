use cfgvault::backup::BackupMetadata;
use cfgvault::config::Config;
use cfgvault::core::VaultResult;
use cfgvault::vendors::format_size;

pub fn run(vendor: Option<String>) -> VaultResult<()> {
    let config = Config::load()?;
    let manager = super::backup_manager(&config)?;

    let backups = manager.list_backups(vendor.as_deref())?;
    if backups.is_empty() {
        match vendor {
            Some(v) => println!("No backups found for {}", v),
            None => println!("No backups found"),
        }
        return Ok(());
    }

    println!("{} backup(s):", backups.len());
    for backup in &backups {
        println!("  {}", format_entry(backup));
    }
    Ok(())
}

fn format_entry(backup: &BackupMetadata) -> String {
    format!(
        "{:<8} {} {:>10}  {} files  {}",
        backup.vendor_id,
        backup.timestamp.format("%Y-%m-%d %H:%M:%S"),
        format_size(backup.size_bytes),
        backup.file_count,
        backup.backup_path.display()
    )
}
