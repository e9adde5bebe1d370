use cfgvault::core::VaultResult;
use cfgvault::vendors::{detect_all, format_size};

pub fn run() -> VaultResult<()> {
    let statuses = detect_all();
    if statuses.is_empty() {
        println!("Could not determine the home directory; no vendors to show.");
        return Ok(());
    }

    println!("Supported vendors:");
    for status in statuses {
        if status.installed {
            println!(
                "  ✓ {:<8} {} ({})",
                status.vendor_id,
                status.config_dir.display(),
                format_size(status.size_bytes)
            );
        } else {
            println!(
                "    {:<8} {} (not installed)",
                status.vendor_id,
                status.config_dir.display()
            );
        }
    }
    Ok(())
}
