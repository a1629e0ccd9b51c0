//! Recursive directory copy and removal.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Copy the tree rooted at `source` into `destination`.
///
/// Directories are created as needed and existing files at the target are
/// overwritten. Symlinks are not followed.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }

    fs::create_dir_all(destination).map_err(|e| Error::at_path(destination, e))?;

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| {
                Error::InvalidRequest(format!("walked outside of {}", source.display()))
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::at_path(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::at_path(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| Error::at_path(&target, e))?;
        }
    }

    Ok(())
}

/// Remove a directory tree. Missing directories are not an error.
pub fn remove_tree(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::at_path(path, e)),
    }
}
