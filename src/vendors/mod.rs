use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Vendor CLIs whose configuration directories we know how to find.
pub const KNOWN_VENDORS: &[&str] = &["claude", "gemini", "codex", "cursor", "aider"];

/// Where a vendor keeps its configuration, and whether it is present.
#[derive(Debug, Clone)]
pub struct VendorStatus {
    pub vendor_id: String,
    pub config_dir: PathBuf,
    pub installed: bool,
    /// Total size of the config directory in bytes; zero when absent.
    pub size_bytes: u64,
}

/// Default config directory for a known vendor id.
///
/// All supported CLIs keep a dot-directory directly under the user's home.
pub fn resolve(vendor_id: &str) -> Option<PathBuf> {
    if !KNOWN_VENDORS.contains(&vendor_id) {
        return None;
    }
    dirs::home_dir().map(|home| home.join(format!(".{}", vendor_id)))
}

/// Status of every known vendor, in registry order.
pub fn detect_all() -> Vec<VendorStatus> {
    KNOWN_VENDORS
        .iter()
        .filter_map(|id| {
            let config_dir = resolve(id)?;
            Some(status_of(id, &config_dir))
        })
        .collect()
}

/// Known vendors whose config directory exists, as (id, dir) pairs.
pub fn installed() -> Vec<(String, PathBuf)> {
    detect_all()
        .into_iter()
        .filter(|s| s.installed)
        .map(|s| (s.vendor_id, s.config_dir))
        .collect()
}

pub fn status_of(vendor_id: &str, config_dir: &Path) -> VendorStatus {
    let installed = config_dir.is_dir();
    VendorStatus {
        vendor_id: vendor_id.to_string(),
        config_dir: config_dir.to_path_buf(),
        installed,
        size_bytes: if installed { dir_size(config_dir) } else { 0 },
    }
}

/// Recursive size of a directory. Unreadable entries are counted as zero
/// rather than failing the walk.
pub fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// Human-readable byte count for CLI output.
pub fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;
    match bytes {
        b if b >= GIB => format!("{:.1} GiB", b as f64 / GIB as f64),
        b if b >= MIB => format!("{:.1} MiB", b as f64 / MIB as f64),
        b if b >= KIB => format!("{:.1} KiB", b as f64 / KIB as f64),
        b => format!("{} B", b),
    }
}
