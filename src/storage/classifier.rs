//! Extension-based file classification.

use crate::config::{IMAGE_EXTENSIONS, TEXT_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Category of a file, decided by its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Text,
    Unsupported,
}

impl FileKind {
    /// Whether the pipeline handles this kind at all.
    pub fn is_supported(self) -> bool {
        self != FileKind::Unsupported
    }
}

/// A supported file found under a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute or caller-relative path to the file.
    pub path: PathBuf,
    /// Size in bytes at scan time.
    pub size: u64,
    /// Classification by extension.
    pub kind: FileKind,
}

impl FileRecord {
    /// File name component, lossily converted.
    pub fn name(&self) -> String {
        file_name(&self.path)
    }
}

/// Classify a path by its extension, case-insensitively.
pub fn classify(path: &Path) -> FileKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileKind::Unsupported;
    };
    let ext = ext.to_ascii_lowercase();
    let ext = ext.as_str();

    if IMAGE_EXTENSIONS.contains(&ext) {
        FileKind::Image
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        FileKind::Video
    } else if TEXT_EXTENSIONS.contains(&ext) {
        FileKind::Text
    } else {
        FileKind::Unsupported
    }
}

/// Recursively collect every supported file under `root`, in sorted walk
/// order.
///
/// Only a missing or unreadable `root` is an error. Entries below it that
/// cannot be read are logged and left out.
pub fn supported_files(root: &Path) -> Result<Vec<FileRecord>> {
    if !root.is_dir() {
        return Err(Error::SourceNotFound(root.to_path_buf()));
    }

    let mut records = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let kind = classify(entry.path());
        if !kind.is_supported() {
            continue;
        }
        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "skipping file without metadata");
                continue;
            }
        };
        records.push(FileRecord {
            path: entry.into_path(),
            size,
            kind,
        });
    }

    Ok(records)
}

/// File name of a path as a `String`, empty when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
