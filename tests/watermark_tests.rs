//! Integration tests for single-file watermark operations.

use std::fs;
use std::path::PathBuf;
use tailmark::codec::{self, scan_tail, TailScan};
use tailmark::storage::{
    add_watermark, extract_watermark_text, has_watermark, remove_watermark, EmbedOutcome,
};
use tailmark::Error;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

fn jpeg_like(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..len).map(|i| (i * 31 % 251) as u8));
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

#[test]
fn test_add_then_extract() {
    let dir = TempDir::new().unwrap();
    let original = jpeg_like(4096);
    let path = write_file(&dir, "Photo-001.jpg", &original);

    let outcome = add_watermark(&path, "ORDER 001").unwrap();
    assert_eq!(outcome, EmbedOutcome::Added { frame_len: 17 });
    assert!(has_watermark(&path).unwrap());
    assert_eq!(
        extract_watermark_text(&path).unwrap().as_deref(),
        Some("ORDER 001")
    );

    let marked = fs::read(&path).unwrap();
    assert_eq!(&marked[..original.len()], &original[..]);
    assert_eq!(&marked[original.len()..], b"<<==VYKLY 778==>>");
}

#[test]
fn test_second_add_is_duplicate() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "clip.mp4", &[0u8; 2048]);

    add_watermark(&path, "First").unwrap();
    let after_first = fs::read(&path).unwrap();

    assert_eq!(
        add_watermark(&path, "Second").unwrap(),
        EmbedOutcome::Duplicate
    );
    assert_eq!(fs::read(&path).unwrap(), after_first);
    assert_eq!(
        extract_watermark_text(&path).unwrap().as_deref(),
        Some("First")
    );
}

#[test]
fn test_remove_restores_original_bytes() {
    let dir = TempDir::new().unwrap();
    let original = jpeg_like(700);
    let path = write_file(&dir, "Photo-002.jpg", &original);

    add_watermark(&path, "Client Rossi 002").unwrap();
    assert!(remove_watermark(&path).unwrap());
    assert_eq!(fs::read(&path).unwrap(), original);
    assert!(!has_watermark(&path).unwrap());

    // Nothing left to remove.
    assert!(!remove_watermark(&path).unwrap());
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_small_and_empty_files() {
    let dir = TempDir::new().unwrap();
    let empty = write_file(&dir, "empty.txt", b"");
    let tiny = write_file(&dir, "tiny.txt", b"hi");

    assert!(!has_watermark(&empty).unwrap());
    assert_eq!(extract_watermark_text(&empty).unwrap(), None);
    assert!(!remove_watermark(&empty).unwrap());

    // A short file is marked and read back like any other.
    add_watermark(&tiny, "x").unwrap();
    assert_eq!(fs::read(&tiny).unwrap(), b"hi<<==e==>>");
    assert!(has_watermark(&tiny).unwrap());
    assert_eq!(extract_watermark_text(&tiny).unwrap().as_deref(), Some("x"));
    assert!(remove_watermark(&tiny).unwrap());
    assert_eq!(fs::read(&tiny).unwrap(), b"hi");
}

#[test]
fn test_frame_outside_tail_window_is_invisible() {
    let dir = TempDir::new().unwrap();
    let mut data = b"head<<==Vykly==>>".to_vec();
    data.extend(std::iter::repeat(b'.').take(200));
    let path = write_file(&dir, "buried.txt", &data);

    assert!(!has_watermark(&path).unwrap());
    assert_eq!(extract_watermark_text(&path).unwrap(), None);
    assert!(!remove_watermark(&path).unwrap());
    assert_eq!(fs::read(&path).unwrap(), data);
}

#[test]
fn test_unterminated_prefix_is_not_a_frame() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.jpg", b"image bytes <<==Vykly 778");

    assert!(!has_watermark(&path).unwrap());
    assert!(!remove_watermark(&path).unwrap());
    // The broken file can still be marked.
    assert!(matches!(
        add_watermark(&path, "ORDER 001").unwrap(),
        EmbedOutcome::Added { .. }
    ));
    assert_eq!(
        extract_watermark_text(&path).unwrap().as_deref(),
        Some("ORDER 001")
    );
}

#[test]
fn test_legacy_marker_is_read_but_not_removed() {
    let dir = TempDir::new().unwrap();
    let mut data = jpeg_like(300);
    data.extend_from_slice(b"*/");
    data.extend_from_slice(codec::encode("Old Order 12").as_bytes());
    data.extend_from_slice(b"\n");
    let path = write_file(&dir, "legacy.jpg", &data);

    assert!(!has_watermark(&path).unwrap());
    assert_eq!(
        extract_watermark_text(&path).unwrap().as_deref(),
        Some("Old Order 12")
    );
    assert!(!remove_watermark(&path).unwrap());
    assert_eq!(fs::read(&path).unwrap(), data);
}

#[test]
fn test_payload_too_long_is_rejected() {
    let dir = TempDir::new().unwrap();
    let original = jpeg_like(64);
    let path = write_file(&dir, "Photo-003.jpg", &original);

    let result = add_watermark(&path, &"x".repeat(93));
    assert!(matches!(
        result,
        Err(Error::PayloadTooLong {
            frame_len: 101,
            max: 100
        })
    ));
    assert_eq!(fs::read(&path).unwrap(), original);

    // The longest payload that still fits.
    add_watermark(&path, &"x".repeat(92)).unwrap();
    assert!(has_watermark(&path).unwrap());
}

#[test]
fn test_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gone.jpg");

    match has_watermark(&path) {
        Err(Error::PathIo { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected path error, got {:?}", other),
    }
    assert!(add_watermark(&path, "x").is_err());
    assert!(!path.exists());
}

#[test]
fn test_scan_tail_over_marked_bytes() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.txt", b"Thank you!");
    add_watermark(&path, "ORDER 009").unwrap();

    let data = fs::read(&path).unwrap();
    let location = scan_tail(&data).frame().unwrap();
    assert_eq!(location.start, 10);
    assert_eq!(location.suffix_start, data.len() - 4);
    assert!(matches!(scan_tail(b"plain text"), TailScan::Absent));
}

#[test]
fn test_text_with_frame_markers_is_rejected() {
    let dir = TempDir::new().unwrap();
    let original = jpeg_like(300);
    let path = write_file(&dir, "Photo-004.jpg", &original);

    for text in ["Studio <<== 001", "A==>>B 002"] {
        assert!(matches!(
            add_watermark(&path, text),
            Err(Error::PayloadContainsMarker(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), original);
    }

    // Removal takes back exactly the appended frame.
    add_watermark(&path, "Studio <- 001").unwrap();
    assert_eq!(
        extract_watermark_text(&path).unwrap().as_deref(),
        Some("Studio <- 001")
    );
    assert!(remove_watermark(&path).unwrap());
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
fn test_legacy_marker_is_read_from_tail_window_only() {
    let dir = TempDir::new().unwrap();
    let mut data = jpeg_like(300);
    data.extend_from_slice(b"*/");
    data.extend_from_slice(codec::encode(&"y".repeat(120)).as_bytes());
    let path = write_file(&dir, "long-legacy.jpg", &data);

    assert_eq!(extract_watermark_text(&path).unwrap(), None);
}
