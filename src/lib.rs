//! cfgvault — backup and restore for AI CLI tool configuration directories
//!
//! This crate provides the cfgvault library, re-exporting core functionality
//! from `cfgvault-core` and organizing the archive, backup, and restore
//! subsystems used by the `cfgvault` binary.

pub use cfgvault_core::{VaultError, VaultResult};

/// Core error and path types re-exported from cfgvault-core.
pub mod core {
    pub use cfgvault_core::core::*;
    pub use cfgvault_core::*;
}

/// Configuration management.
pub mod config;

/// Archive packing, listing, and safe extraction.
pub mod archive;

/// Backup orchestration: archives, manifests, retention.
pub mod backup;

/// Restore orchestration: previews, full and selective restores, rollback.
pub mod restore;

/// Progress milestone reporting.
pub mod progress;

/// Known vendor detection.
pub mod vendors;
