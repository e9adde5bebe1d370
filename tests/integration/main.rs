//! Integration tests for the cfgvault CLI and managers.

pub mod common;

mod backup;
mod cli;
mod restore;
