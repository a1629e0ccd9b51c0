//! Deterministic, uncompressed zip archives of a directory tree.
//!
//! Every entry uses the STORED method, so compressed size equals the raw
//! size. The writer computes the CRC-32 over the raw bytes and patches the
//! local header in place, so no streaming data descriptors are emitted.
//! Timestamps are fixed at the zip epoch and entries follow a
//! name-sorted walk, which makes the output byte-identical for a given tree.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// What an archive ended up containing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Path of the written archive.
    pub path: PathBuf,
    /// Number of file entries.
    pub files: usize,
    /// Number of directory entries.
    pub directories: usize,
    /// Sum of file sizes stored.
    pub bytes: u64,
}

/// Whether a file or directory name is left out of archives.
///
/// Matching directories are skipped together with everything below them.
pub fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__MACOSX") || name.ends_with(".DS_Store")
}

/// Archive `dir` into `<dir>.zip` next to it.
pub fn write_stored_archive(dir: &Path) -> Result<ArchiveSummary> {
    let name = dir
        .file_name()
        .ok_or_else(|| Error::InvalidRequest(format!("cannot archive {}", dir.display())))?;
    let mut archive_name = name.to_os_string();
    archive_name.push(".zip");
    let archive_path = dir.with_file_name(archive_name);
    write_archive(dir, &archive_path)
}

/// Archive the contents of `dir` into `archive_path`.
///
/// Entry names are relative to `dir`, `/`-separated, and `dir` itself is not
/// an entry. A partially written archive is removed on failure.
pub fn write_archive(dir: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    if !dir.is_dir() {
        return Err(Error::SourceNotFound(dir.to_path_buf()));
    }

    let result = write_entries(dir, archive_path);
    if result.is_err() {
        let _ = fs::remove_file(archive_path);
    }
    result
}

fn write_entries(dir: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    let file = File::create(archive_path).map_err(|e| Error::at_path(archive_path, e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default());

    let mut summary = ArchiveSummary {
        path: archive_path.to_path_buf(),
        files: 0,
        directories: 0,
        bytes: 0,
    };

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded_entry(e));

    for entry in walker {
        let entry = entry?;
        let entry_name = entry_name(dir, entry.path())?;

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", entry_name), options)?;
            summary.directories += 1;
        } else if entry.file_type().is_file() {
            zip.start_file(entry_name, options)?;
            let mut source =
                File::open(entry.path()).map_err(|e| Error::at_path(entry.path(), e))?;
            let copied =
                io::copy(&mut source, &mut zip).map_err(|e| Error::at_path(entry.path(), e))?;
            summary.files += 1;
            summary.bytes += copied;
        }
    }

    zip.finish()?;
    Ok(summary)
}

fn is_excluded_entry(entry: &DirEntry) -> bool {
    entry.file_name().to_str().map(is_excluded).unwrap_or(false)
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| {
        Error::InvalidRequest(format!("{} is outside {}", path.display(), root.display()))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
