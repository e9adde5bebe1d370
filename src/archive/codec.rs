use crate::archive::safety::is_safe_member;
use crate::core::{VaultError, VaultResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tar::{Archive, EntryType};
use tracing::warn;

/// Kind of a single archive member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    File,
    Directory,
    Symlink,
    HardLink,
    Other,
}

impl MemberKind {
    fn from_entry_type(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => MemberKind::File,
            EntryType::Directory => MemberKind::Directory,
            EntryType::Symlink => MemberKind::Symlink,
            EntryType::Link => MemberKind::HardLink,
            _ => MemberKind::Other,
        }
    }
}

/// One member listed from an archive, without extraction.
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    pub name: String,
    pub kind: MemberKind,
    pub size: u64,
}

/// Outcome of a broad (caller-did-not-choose-members) extraction.
///
/// Unsafe members are dropped, never extracted, but their names are carried
/// here so callers can surface possible tampering.
#[derive(Debug, Default)]
pub struct Unpacked {
    /// Relative paths of file and link members actually written.
    pub extracted: Vec<PathBuf>,
    /// Member names rejected by the path safety validator.
    pub skipped: Vec<String>,
}

/// Packs vendor config trees into gzip'd tar archives and extracts them,
/// routing every member through the path safety validator.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveCodec {
    compression_level: u32,
}

impl Default for ArchiveCodec {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

impl ArchiveCodec {
    pub fn new(compression_level: u32) -> Self {
        Self {
            compression_level: compression_level.min(9),
        }
    }

    /// Pack `source_dir` into a gzip'd tar at `dest_archive_path` whose
    /// single top-level entry is named `vendor_id`.
    pub fn pack(
        &self,
        source_dir: &Path,
        vendor_id: &str,
        dest_archive_path: &Path,
    ) -> VaultResult<()> {
        if !source_dir.is_dir() {
            return Err(VaultError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("source directory not readable: {}", source_dir.display()),
            )));
        }

        let file = File::create(dest_archive_path)?;
        let encoder = GzEncoder::new(
            BufWriter::new(file),
            Compression::new(self.compression_level),
        );
        let mut builder = tar::Builder::new(encoder);
        // Symlinks are archived as links, not chased into their targets.
        builder.follow_symlinks(false);
        builder.append_dir_all(vendor_id, source_dir)?;

        let encoder = builder.into_inner()?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Enumerate members without extracting anything.
    pub fn list_members(&self, archive_path: &Path) -> VaultResult<Vec<ArchiveMember>> {
        let mut archive = open_archive(archive_path)?;
        let entries = archive
            .entries()
            .map_err(|e| invalid(archive_path, &e.to_string()))?;

        let mut members = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| invalid(archive_path, &e.to_string()))?;
            let name = entry
                .path()
                .map_err(|e| invalid(archive_path, &e.to_string()))?
                .to_string_lossy()
                // Directory entries carry a trailing slash in the raw
                // header; member names are reported without it.
                .trim_end_matches('/')
                .to_string();
            members.push(ArchiveMember {
                name,
                kind: MemberKind::from_entry_type(entry.header().entry_type()),
                size: entry.size(),
            });
        }
        Ok(members)
    }

    /// Extract every member that passes path safety validation into
    /// `dest_dir`. Unsafe members are dropped and reported in the result.
    pub fn unpack_all(&self, archive_path: &Path, dest_dir: &Path) -> VaultResult<Unpacked> {
        fs::create_dir_all(dest_dir)?;

        let mut archive = open_archive(archive_path)?;
        let entries = archive
            .entries()
            .map_err(|e| invalid(archive_path, &e.to_string()))?;

        let mut result = Unpacked::default();
        for entry in entries {
            let mut entry = entry.map_err(|e| invalid(archive_path, &e.to_string()))?;
            let member = entry
                .path()
                .map_err(|e| invalid(archive_path, &e.to_string()))?
                .into_owned();
            let kind = MemberKind::from_entry_type(entry.header().entry_type());
            let link = entry.link_name().ok().flatten().map(|c| c.into_owned());

            if !is_safe_member(&member, kind, link.as_deref(), dest_dir) {
                warn!(member = %member.display(), "dropping unsafe archive member");
                result.skipped.push(member.display().to_string());
                continue;
            }

            if entry.unpack_in(dest_dir)? && kind != MemberKind::Directory {
                result.extracted.push(member);
            }
        }
        Ok(result)
    }

    /// Extract exactly the members named in `chosen_members`.
    ///
    /// Fail-closed: if any chosen member is unsafe the call returns
    /// `UnsafeArchiveMember` and extracts nothing. The archive is walked
    /// once to validate the full selection and a second time to extract.
    pub fn unpack_selected(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        chosen_members: &[String],
    ) -> VaultResult<Vec<PathBuf>> {
        let chosen: HashSet<&str> = chosen_members.iter().map(String::as_str).collect();

        let mut archive = open_archive(archive_path)?;
        let entries = archive
            .entries()
            .map_err(|e| invalid(archive_path, &e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| invalid(archive_path, &e.to_string()))?;
            let member = entry
                .path()
                .map_err(|e| invalid(archive_path, &e.to_string()))?
                .into_owned();
            let name = member.display().to_string();
            if !chosen.contains(name.trim_end_matches('/')) {
                continue;
            }
            let kind = MemberKind::from_entry_type(entry.header().entry_type());
            let link = entry.link_name().ok().flatten().map(|c| c.into_owned());
            if !is_safe_member(&member, kind, link.as_deref(), dest_dir) {
                return Err(VaultError::UnsafeArchiveMember(name));
            }
        }

        fs::create_dir_all(dest_dir)?;
        let mut archive = open_archive(archive_path)?;
        let entries = archive
            .entries()
            .map_err(|e| invalid(archive_path, &e.to_string()))?;

        let mut extracted = Vec::new();
        for entry in entries {
            let mut entry = entry.map_err(|e| invalid(archive_path, &e.to_string()))?;
            let member = entry
                .path()
                .map_err(|e| invalid(archive_path, &e.to_string()))?
                .into_owned();
            let name = member.display().to_string();
            if !chosen.contains(name.trim_end_matches('/')) {
                continue;
            }
            let kind = MemberKind::from_entry_type(entry.header().entry_type());
            if entry.unpack_in(dest_dir)? && kind != MemberKind::Directory {
                extracted.push(member);
            }
        }
        Ok(extracted)
    }
}

fn open_archive(path: &Path) -> VaultResult<Archive<GzDecoder<BufReader<File>>>> {
    let file = File::open(path).map_err(|e| invalid(path, &e.to_string()))?;
    Ok(Archive::new(GzDecoder::new(BufReader::new(file))))
}

fn invalid(path: &Path, detail: &str) -> VaultError {
    VaultError::InvalidArchive(format!("{}: {}", path.display(), detail))
}
