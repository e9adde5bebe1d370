//! Common utilities for integration tests

use std::fs;
use std::path::Path;
use std::process::Command;

pub fn cfgvault_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cfgvault"))
}

/// Binary invocation isolated from the real user environment: config and
/// data land under `home`, so tests never touch actual vendor directories.
pub fn isolated_command(home: &Path) -> Command {
    let mut cmd = cfgvault_command();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"));
    cmd
}

/// A small vendor config tree matching what a real CLI leaves behind.
pub fn seed_vendor_dir(dir: &Path) {
    fs::create_dir_all(dir.join("mcp_servers")).unwrap();
    fs::write(dir.join("settings.json"), b"{\"model\":\"gemini2\"}\n").unwrap();
    fs::write(dir.join("mcp_servers/one.json"), b"{\"p\":\"x\"}\n").unwrap();
}
