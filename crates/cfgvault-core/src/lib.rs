//! Core utilities for cfgvault.
//!
//! Holds the shared error type and platform path helpers so that both the
//! main binary and any future tooling crates agree on failure taxonomy and
//! on-disk locations.

pub mod core;

pub use core::error::{VaultError, VaultResult};
