use crate::core::{VaultError, VaultResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name, stored beside a vendor's archives.
pub const MANIFEST_NAME: &str = "backup_manifest.json";

/// Immutable record of one completed backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub vendor_id: String,
    pub timestamp: DateTime<Utc>,
    pub backup_path: PathBuf,
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 digest of the archive bytes.
    pub checksum: String,
    pub file_count: usize,
    /// Original source path the backup was taken from.
    pub config_dir: String,
}

/// Per-vendor ordered collection of backup metadata.
///
/// Entries *should* each point at an existing archive file, but readers must
/// tolerate stale entries whose file has since disappeared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorManifest {
    pub vendor_id: String,
    pub backups: Vec<BackupMetadata>,
}

impl VendorManifest {
    pub fn new(vendor_id: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            backups: Vec::new(),
        }
    }

    /// Load the manifest from `vendor_dir`, or an empty one if none exists.
    pub fn load(vendor_dir: &Path, vendor_id: &str) -> VaultResult<Self> {
        let path = vendor_dir.join(MANIFEST_NAME);
        if !path.exists() {
            return Ok(Self::new(vendor_id));
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| VaultError::Manifest(format!("{}: {}", path.display(), e)))
    }

    /// Persist the manifest beside the vendor's archives.
    ///
    /// Written to a temp file first and renamed into place so a crashed
    /// writer cannot leave a half-written manifest. Concurrent writers are
    /// still unsynchronized (single-operator tool).
    pub fn save(&self, vendor_dir: &Path) -> VaultResult<()> {
        let path = vendor_dir.join(MANIFEST_NAME);
        let tmp = vendor_dir.join(format!(".{}.tmp", MANIFEST_NAME));
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Find the entry recorded for a given archive path.
    pub fn entry_for(&self, archive_path: &Path) -> Option<&BackupMetadata> {
        self.backups.iter().find(|b| b.backup_path == archive_path)
    }
}
