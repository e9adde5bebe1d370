use crate::core::error::{VaultError, VaultResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the cfgvault home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\cfgvault
/// - Linux: ~/.config/cfgvault
/// - macOS: ~/Library/Application Support/cfgvault
pub fn vault_home() -> VaultResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| VaultError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("cfgvault"))
}

/// Get the config file path
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\cfgvault\config.yaml
/// - Linux: ~/.config/cfgvault/config.yaml
/// - macOS: ~/Library/Application Support/cfgvault/config.yaml
pub fn config_file() -> VaultResult<PathBuf> {
    Ok(vault_home()?.join("config.yaml"))
}

/// Get the default backup root directory
///
/// Platform-specific locations:
/// - Windows: %LOCALAPPDATA%\cfgvault\backups
/// - Linux: ~/.local/share/cfgvault/backups
/// - macOS: ~/Library/Application Support/cfgvault/backups
pub fn default_backup_root() -> VaultResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| VaultError::Path("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("cfgvault").join("backups"))
}

/// Create a directory and its parents if they don't exist
pub fn ensure_dir(path: &Path) -> VaultResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            VaultError::Path(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    Ok(())
}
