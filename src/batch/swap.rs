//! Swapping the names of two numbered photos inside one copy.

use crate::batch::numbering::extract_file_number;
use crate::batch::progress::EventSink;
use crate::config::SWAP_OFFSET;
use crate::error::{Error, Result};
use crate::storage::{file_name, supported_files, FileKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Result of a swap step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The two files exchanged names.
    Swapped { first: PathBuf, second: PathBuf },
    /// At least one side of the pair is missing; nothing was renamed.
    MissingPair { base: u32, partner: u32 },
}

/// Swap the image numbered `base` with the image numbered `base + 10`.
pub fn swap_pair(dir: &Path, base: u32, sink: &dyn EventSink) -> Result<SwapOutcome> {
    let partner = base.saturating_add(SWAP_OFFSET);
    sink.info(format!(
        "Starting swap operation for number {} with {} ...",
        base, partner
    ));

    let images: Vec<PathBuf> = supported_files(dir)?
        .into_iter()
        .filter(|r| r.kind == FileKind::Image)
        .map(|r| r.path)
        .collect();
    let numbered = |n: u32| {
        images
            .iter()
            .find(|p| extract_file_number(&file_name(p)) == Some(n))
            .cloned()
    };

    let (Some(first), Some(second)) = (numbered(base), numbered(partner)) else {
        warn!(dir = %dir.display(), base, partner, "swap pair incomplete");
        sink.warn(format!(
            "No matching pair found for swapping in folder {} (need {} and {})",
            file_name(dir),
            base,
            partner
        ));
        return Ok(SwapOutcome::MissingPair { base, partner });
    };

    swap_files(&first, &second)?;
    info!(first = %first.display(), second = %second.display(), "files swapped");
    sink.info(format!(
        "Successfully swapped {} <--> {}",
        file_name(&first),
        file_name(&second)
    ));
    Ok(SwapOutcome::Swapped { first, second })
}

/// Exchange the contents of two paths with three renames through a
/// temporary name next to `first`.
///
/// If the second rename fails the first is undone. If the last rename fails
/// the temporary file is left in place and named in the error.
pub fn swap_files(first: &Path, second: &Path) -> Result<()> {
    let temp = temp_path(first);

    fs::rename(first, &temp).map_err(|e| Error::at_path(first, e))?;

    if let Err(e) = fs::rename(second, first) {
        if let Err(undo) = fs::rename(&temp, first) {
            warn!(temp = %temp.display(), error = %undo, "could not undo swap");
        }
        return Err(Error::at_path(second, e));
    }

    fs::rename(&temp, second).map_err(|e| Error::at_path(&temp, e))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    path.with_file_name(format!("temp_{}_{}", nanos, file_name(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::progress::MemorySink;
    use tempfile::TempDir;

    #[test]
    fn test_swaps_pair_contents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Photo-003.jpg"), b"three").unwrap();
        fs::write(dir.path().join("Photo-013.jpg"), b"thirteen").unwrap();
        fs::write(dir.path().join("Photo-004.jpg"), b"four").unwrap();

        let outcome = swap_pair(dir.path(), 3, &MemorySink::new()).unwrap();
        assert!(matches!(outcome, SwapOutcome::Swapped { .. }));
        assert_eq!(fs::read(dir.path().join("Photo-003.jpg")).unwrap(), b"thirteen");
        assert_eq!(fs::read(dir.path().join("Photo-013.jpg")).unwrap(), b"three");
        assert_eq!(fs::read(dir.path().join("Photo-004.jpg")).unwrap(), b"four");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_missing_partner_renames_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Photo-003.jpg"), b"three").unwrap();
        fs::write(dir.path().join("Photo-012.jpg"), b"twelve").unwrap();
        let sink = MemorySink::new();

        let outcome = swap_pair(dir.path(), 3, &sink).unwrap();
        assert_eq!(outcome, SwapOutcome::MissingPair { base: 3, partner: 13 });
        assert_eq!(fs::read(dir.path().join("Photo-003.jpg")).unwrap(), b"three");
        assert_eq!(fs::read(dir.path().join("Photo-012.jpg")).unwrap(), b"twelve");
        assert!(sink
            .messages()
            .iter()
            .any(|m| m.contains("need 3 and 13")));
    }

    #[test]
    fn test_non_images_are_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Photo-003.jpg"), b"three").unwrap();
        fs::write(dir.path().join("clip-013.mp4"), b"video").unwrap();

        let outcome = swap_pair(dir.path(), 3, &MemorySink::new()).unwrap();
        assert!(matches!(outcome, SwapOutcome::MissingPair { .. }));
    }

    #[test]
    fn test_swap_files_missing_second_rolls_back() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.jpg");
        fs::write(&first, b"a").unwrap();

        let result = swap_files(&first, &dir.path().join("missing.jpg"));
        assert!(result.is_err());
        assert_eq!(fs::read(&first).unwrap(), b"a");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
