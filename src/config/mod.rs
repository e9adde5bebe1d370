use crate::core::path::{config_file, default_backup_root, ensure_dir};
use crate::core::{VaultError, VaultResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backup root directory (defaults to the platform data directory)
    ///
    /// Default locations:
    /// - Windows: %LOCALAPPDATA%\cfgvault\backups
    /// - Linux: ~/.local/share/cfgvault/backups
    /// - macOS: ~/Library/Application Support/cfgvault/backups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_root: Option<String>,

    /// Backups kept per vendor; older ones are pruned after each success
    #[serde(default = "default_retention_count")]
    pub retention_count: usize,

    /// Gzip compression level (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_retention_count() -> usize {
    5
}

fn default_compression_level() -> u32 {
    6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_root: None,
            retention_count: default_retention_count(),
            compression_level: default_compression_level(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, creating a default
    /// if it doesn't exist.
    pub fn load() -> VaultResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| VaultError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> VaultResult<()> {
        let config_path = config_file()?;
        if let Some(parent) = config_path.parent() {
            ensure_dir(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> VaultResult<()> {
        if self.retention_count == 0 {
            return Err(VaultError::Config(
                "retention_count must be at least 1".to_string(),
            ));
        }
        if self.compression_level > 9 {
            return Err(VaultError::Config(format!(
                "compression_level must be 0-9, got {}",
                self.compression_level
            )));
        }
        Ok(())
    }

    /// Resolved backup root: configured override or the platform default.
    pub fn backup_root(&self) -> VaultResult<PathBuf> {
        match &self.backup_root {
            Some(root) => Ok(PathBuf::from(root)),
            None => default_backup_root(),
        }
    }
}
