//! Embed, detect, extract and remove tail frames on a single file.
//!
//! Every function opens the file for the shortest possible read-modify-write
//! and drops the handle before returning, on success and on error alike.

use crate::codec::frame::{build_frame, frame_text, legacy_text, scan_tail, TailScan};
use crate::config::{MIN_FRAME_LEN, TAIL_WINDOW};
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Result of an embed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedOutcome {
    /// A new frame of `frame_len` bytes was appended.
    Added { frame_len: usize },
    /// A frame was already present; the file was left untouched.
    Duplicate,
}

/// Last bytes of a file together with the full file length.
struct Tail {
    window: Vec<u8>,
    file_len: u64,
}

/// Read up to [`TAIL_WINDOW`] trailing bytes.
///
/// Returns `None` for files too short to hold even an empty frame.
fn read_tail(path: &Path) -> Result<Option<Tail>> {
    let mut file = File::open(path).map_err(|e| Error::at_path(path, e))?;
    let file_len = file.metadata().map_err(|e| Error::at_path(path, e))?.len();
    if file_len < MIN_FRAME_LEN as u64 {
        return Ok(None);
    }

    let window_len = file_len.min(TAIL_WINDOW as u64);
    file.seek(SeekFrom::Start(file_len - window_len))
        .map_err(|e| Error::at_path(path, e))?;
    let mut window = vec![0u8; window_len as usize];
    file.read_exact(&mut window)
        .map_err(|e| Error::at_path(path, e))?;

    Ok(Some(Tail { window, file_len }))
}

fn scan_file(path: &Path) -> Result<Option<(Tail, TailScan)>> {
    let Some(tail) = read_tail(path)? else {
        return Ok(None);
    };
    let scan = scan_tail(&tail.window);
    if let TailScan::Malformed { prefix_at } = scan {
        debug!(path = %path.display(), prefix_at, "frame prefix without suffix, ignoring");
    }
    Ok(Some((tail, scan)))
}

/// Check whether a file ends with a current-format frame.
pub fn has_watermark(path: &Path) -> Result<bool> {
    Ok(matches!(scan_file(path)?, Some((_, TailScan::Frame(_)))))
}

/// Append a frame carrying `plaintext` unless one is already present.
///
/// Existing bytes are never modified.
pub fn add_watermark(path: &Path, plaintext: &str) -> Result<EmbedOutcome> {
    let frame = build_frame(plaintext)?;
    if has_watermark(path)? {
        return Ok(EmbedOutcome::Duplicate);
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| Error::at_path(path, e))?;
    file.seek(SeekFrom::End(0))
        .map_err(|e| Error::at_path(path, e))?;
    file.write_all(&frame)
        .map_err(|e| Error::at_path(path, e))?;
    file.flush().map_err(|e| Error::at_path(path, e))?;

    Ok(EmbedOutcome::Added {
        frame_len: frame.len(),
    })
}

/// Decode the watermark text of a file.
///
/// Falls back to the legacy prefix-only format when no current frame is
/// present. Returns `None` when neither is found.
pub fn extract_watermark_text(path: &Path) -> Result<Option<String>> {
    let Some((tail, scan)) = scan_file(path)? else {
        return Ok(None);
    };
    match scan {
        TailScan::Frame(location) => Ok(Some(frame_text(&tail.window, location))),
        _ => Ok(legacy_text(&tail.window)),
    }
}

/// Truncate a file at the start of its current-format frame.
///
/// Returns `false` without touching the file when there is no frame.
/// Legacy frames are never removed.
pub fn remove_watermark(path: &Path) -> Result<bool> {
    let Some((tail, TailScan::Frame(location))) = scan_file(path)? else {
        return Ok(false);
    };

    let window_len = tail.window.len() as u64;
    let offset = tail.file_len - (window_len - location.start as u64);

    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| Error::at_path(path, e))?;
    file.set_len(offset).map_err(|e| Error::at_path(path, e))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_add_then_detect() {
        let file = create_test_file(&[7u8; 500]);
        assert!(!has_watermark(file.path()).unwrap());

        let outcome = add_watermark(file.path(), "ORDER 001").unwrap();
        assert_eq!(outcome, EmbedOutcome::Added { frame_len: 17 });
        assert!(has_watermark(file.path()).unwrap());
        assert_eq!(fs::metadata(file.path()).unwrap().len(), 517);
    }

    #[test]
    fn test_original_content_preserved() {
        let original = b"Original content here, quite a few bytes of it.".repeat(4);
        let file = create_test_file(&original);
        add_watermark(file.path(), "keep").unwrap();

        let data = fs::read(file.path()).unwrap();
        assert_eq!(&data[..original.len()], &original[..]);
    }

    #[test]
    fn test_second_add_is_noop() {
        let file = create_test_file(&[1u8; 300]);
        add_watermark(file.path(), "first").unwrap();
        let after_first = fs::read(file.path()).unwrap();

        let outcome = add_watermark(file.path(), "second").unwrap();
        assert_eq!(outcome, EmbedOutcome::Duplicate);
        assert_eq!(fs::read(file.path()).unwrap(), after_first);
    }

    #[test]
    fn test_small_file_round_trip() {
        let file = create_test_file(b"");
        add_watermark(file.path(), "ORDER 002").unwrap();
        assert!(has_watermark(file.path()).unwrap());
        assert_eq!(
            extract_watermark_text(file.path()).unwrap().as_deref(),
            Some("ORDER 002")
        );
        assert_eq!(
            add_watermark(file.path(), "ORDER 002").unwrap(),
            EmbedOutcome::Duplicate
        );
    }

    #[test]
    fn test_extract_text() {
        let file = create_test_file(&[0u8; 150]);
        add_watermark(file.path(), "Studio Lumen 014").unwrap();
        assert_eq!(
            extract_watermark_text(file.path()).unwrap().as_deref(),
            Some("Studio Lumen 014")
        );
    }

    #[test]
    fn test_extract_legacy() {
        let mut content = vec![b'x'; 200];
        content.extend_from_slice(b"*/Vykly 772");
        let file = create_test_file(&content);
        assert!(!has_watermark(file.path()).unwrap());
        assert_eq!(
            extract_watermark_text(file.path()).unwrap().as_deref(),
            Some("Order 005")
        );
        assert!(!remove_watermark(file.path()).unwrap());
    }

    #[test]
    fn test_remove_shortens_by_frame_length() {
        let file = create_test_file(&[9u8; 400]);
        add_watermark(file.path(), "ORDER 010").unwrap();
        let marked_len = fs::metadata(file.path()).unwrap().len();

        assert!(remove_watermark(file.path()).unwrap());
        assert_eq!(fs::metadata(file.path()).unwrap().len(), marked_len - 17);
        assert_eq!(fs::read(file.path()).unwrap(), vec![9u8; 400]);
        assert!(!has_watermark(file.path()).unwrap());
    }

    #[test]
    fn test_remove_without_frame_is_noop() {
        let file = create_test_file(&[3u8; 120]);
        assert!(!remove_watermark(file.path()).unwrap());
        assert_eq!(fs::metadata(file.path()).unwrap().len(), 120);
    }

    #[test]
    fn test_tiny_file_reports_no_watermark() {
        let file = create_test_file(b"<<=");
        assert!(!has_watermark(file.path()).unwrap());
        assert_eq!(extract_watermark_text(file.path()).unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("gone.jpg");
        assert!(matches!(
            has_watermark(&missing),
            Err(Error::PathIo { .. })
        ));
    }

    #[test]
    fn test_oversized_payload_leaves_file_untouched() {
        let file = create_test_file(&[5u8; 64]);
        let long = "y".repeat(200);
        assert!(matches!(
            add_watermark(file.path(), &long),
            Err(Error::PayloadTooLong { .. })
        ));
        assert_eq!(fs::metadata(file.path()).unwrap().len(), 64);
    }
}
