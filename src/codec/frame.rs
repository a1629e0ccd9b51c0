//! Frame layout and the bounded tail scan.
//!
//! A frame is `FRAME_PREFIX + encode(text) + FRAME_SUFFIX`, appended at the
//! end of a file. Detection only ever looks at the last [`TAIL_WINDOW`]
//! bytes: the prefix is searched backward from the end of the window, then
//! the suffix forward from the end of that prefix.

use crate::codec::shift::{decode, encode};
use crate::config::{FRAME_PREFIX, FRAME_SUFFIX, LEGACY_PREFIX, MIN_FRAME_LEN, TAIL_WINDOW};
use crate::error::{Error, Result};

/// Position of a current-format frame inside a tail window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLocation {
    /// Offset of the first prefix byte.
    pub start: usize,
    /// Offset of the first suffix byte.
    pub suffix_start: usize,
}

impl FrameLocation {
    /// Byte range of the encoded payload.
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        self.start + FRAME_PREFIX.len()..self.suffix_start
    }

    /// Total frame length including both markers.
    pub fn len(&self) -> usize {
        self.suffix_start + FRAME_SUFFIX.len() - self.start
    }

    /// A frame always holds both markers, so it is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Outcome of scanning a tail window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailScan {
    /// A complete frame was found.
    Frame(FrameLocation),
    /// A prefix without a later suffix. Callers treat this as no frame.
    Malformed { prefix_at: usize },
    /// No prefix in the window.
    Absent,
}

impl TailScan {
    /// The located frame, if complete.
    pub fn frame(self) -> Option<FrameLocation> {
        match self {
            TailScan::Frame(location) => Some(location),
            _ => None,
        }
    }
}

/// Build the frame bytes carrying `plaintext`.
///
/// Fails when the frame would not fit in the tail window, since such a frame
/// could never be detected again and would be embedded twice. Also fails
/// when the encoded text contains marker bytes that would make the scan stop
/// inside the payload.
pub fn build_frame(plaintext: &str) -> Result<Vec<u8>> {
    let encoded = encode(plaintext);
    let frame_len = MIN_FRAME_LEN + encoded.len();
    if frame_len > TAIL_WINDOW {
        return Err(Error::PayloadTooLong {
            frame_len,
            max: TAIL_WINDOW,
        });
    }

    let mut frame = Vec::with_capacity(frame_len);
    frame.extend_from_slice(FRAME_PREFIX);
    frame.extend_from_slice(encoded.as_bytes());
    frame.extend_from_slice(FRAME_SUFFIX);

    let expected = FrameLocation {
        start: 0,
        suffix_start: frame_len - FRAME_SUFFIX.len(),
    };
    if scan_tail(&frame) != TailScan::Frame(expected) {
        return Err(Error::PayloadContainsMarker(plaintext.to_string()));
    }
    Ok(frame)
}

/// Look for a current-format frame in a tail window.
pub fn scan_tail(window: &[u8]) -> TailScan {
    if window.len() < MIN_FRAME_LEN {
        return TailScan::Absent;
    }
    let Some(start) = rfind(window, FRAME_PREFIX) else {
        return TailScan::Absent;
    };
    match find_from(window, FRAME_SUFFIX, start + FRAME_PREFIX.len()) {
        Some(suffix_start) => TailScan::Frame(FrameLocation {
            start,
            suffix_start,
        }),
        None => TailScan::Malformed { prefix_at: start },
    }
}

/// Decode the payload of a located frame.
pub fn frame_text(window: &[u8], location: FrameLocation) -> String {
    decode(&String::from_utf8_lossy(&window[location.payload_range()]))
}

/// Best-effort read of the legacy prefix-only format.
///
/// Everything after the last legacy marker is taken as ciphertext, trimmed
/// and decoded. Unrelated trailing bytes end up in the result.
pub fn legacy_text(window: &[u8]) -> Option<String> {
    let at = rfind(window, LEGACY_PREFIX)?;
    let rest = String::from_utf8_lossy(&window[at + LEGACY_PREFIX.len()..]);
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(decode(trimmed))
}

/// Last occurrence of `pattern` in `data`.
fn rfind(data: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || data.len() < pattern.len() {
        return None;
    }
    (0..=data.len() - pattern.len())
        .rev()
        .find(|&i| &data[i..i + pattern.len()] == pattern)
}

/// First occurrence of `pattern` in `data` at or after `from`.
fn find_from(data: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if pattern.is_empty() || data.len() < pattern.len() || from > data.len() - pattern.len() {
        return None;
    }
    (from..=data.len() - pattern.len()).find(|&i| &data[i..i + pattern.len()] == pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_content(content: &[u8], tail: &[u8]) -> Vec<u8> {
        let mut data = content.to_vec();
        data.extend_from_slice(tail);
        data
    }

    #[test]
    fn test_build_frame_layout() {
        let frame = build_frame("ORDER 001").unwrap();
        assert!(frame.starts_with(FRAME_PREFIX));
        assert!(frame.ends_with(FRAME_SUFFIX));
        assert_eq!(&frame[4..frame.len() - 4], b"VYKLY 778");
    }

    #[test]
    fn test_build_frame_rejects_oversized_payload() {
        let text = "x".repeat(TAIL_WINDOW);
        assert!(matches!(
            build_frame(&text),
            Err(Error::PayloadTooLong { .. })
        ));
    }

    #[test]
    fn test_build_frame_rejects_embedded_markers() {
        for text in ["Studio <<== 001", "A==>>B 002", "x<<=", "<<====>>"] {
            assert!(
                matches!(build_frame(text), Err(Error::PayloadContainsMarker(_))),
                "{:?} was accepted",
                text
            );
        }
        // Marker characters on their own are fine.
        let frame = build_frame("a=b <c> 003").unwrap();
        let location = scan_tail(&frame).frame().unwrap();
        assert_eq!(location.len(), frame.len());
        assert_eq!(frame_text(&frame, location), "a=b <c> 003");
    }

    #[test]
    fn test_scan_finds_frame_and_text() {
        let frame = build_frame("Studio 042").unwrap();
        let window = with_content(&[0xFFu8; 20], &frame);
        let location = scan_tail(&window).frame().unwrap();
        assert_eq!(location.start, 20);
        assert_eq!(location.len(), frame.len());
        assert_eq!(frame_text(&window, location), "Studio 042");
    }

    #[test]
    fn test_scan_prefers_last_prefix() {
        let first = build_frame("one").unwrap();
        let second = build_frame("two").unwrap();
        let window = with_content(&first, &second);
        let location = scan_tail(&window).frame().unwrap();
        assert_eq!(location.start, first.len());
        assert_eq!(frame_text(&window, location), "two");
    }

    #[test]
    fn test_prefix_without_suffix_is_malformed() {
        let window = with_content(b"some bytes ", b"<<==abc");
        assert_eq!(scan_tail(&window), TailScan::Malformed { prefix_at: 11 });
        assert!(scan_tail(&window).frame().is_none());
    }

    #[test]
    fn test_suffix_before_prefix_is_malformed() {
        let window = b"==>> then <<== dangling".to_vec();
        assert!(matches!(scan_tail(&window), TailScan::Malformed { .. }));
    }

    #[test]
    fn test_absent_and_short_windows() {
        assert_eq!(scan_tail(b"plain file content"), TailScan::Absent);
        assert_eq!(scan_tail(b"<<=="), TailScan::Absent);
        assert_eq!(scan_tail(b""), TailScan::Absent);
    }

    #[test]
    fn test_empty_payload_frame() {
        let window = b"<<====>>".to_vec();
        let location = scan_tail(&window).frame().unwrap();
        assert_eq!(location.payload_range(), 4..4);
        assert_eq!(frame_text(&window, location), "");
    }

    #[test]
    fn test_legacy_marker() {
        let window = with_content(b"binary junk", b"*/VYKLY 778\n");
        assert_eq!(legacy_text(&window).as_deref(), Some("ORDER 001"));
        assert_eq!(legacy_text(b"no marker here"), None);
        assert_eq!(legacy_text(b"ends with marker */  "), None);
    }
}
