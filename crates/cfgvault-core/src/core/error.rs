use thiserror::Error;

pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The vendor's source configuration directory does not exist.
    #[error("Vendor not installed: {0}")]
    NotInstalled(String),

    /// A backup run failed; carries the per-vendor failure summary.
    #[error("Backup failed: {0}")]
    Backup(String),

    /// The file is not a readable archive of the expected format.
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// An archive member would escape the extraction root. Raised only on
    /// the explicit-subset extraction path; broad extraction filters and
    /// reports instead.
    #[error("Unsafe archive member: {0}")]
    UnsafeArchiveMember(String),

    #[error("Manifest error: {0}")]
    Manifest(String),
}
