pub mod manager;
pub mod metadata;

pub use manager::{BackupManager, BackupResult, BackupSummary};
pub use metadata::{BackupMetadata, VendorManifest, MANIFEST_NAME};
