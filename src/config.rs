//! Configuration constants and types for tailmark.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Start marker of a current-format frame.
pub const FRAME_PREFIX: &[u8] = b"<<==";

/// End marker of a current-format frame.
pub const FRAME_SUFFIX: &[u8] = b"==>>";

/// Marker of the older prefix-only format (no terminator, decode only).
pub const LEGACY_PREFIX: &[u8] = b"*/";

/// Number of trailing bytes scanned for a frame.
///
/// Also the largest frame that can be embedded.
pub const TAIL_WINDOW: usize = 100;

/// Smallest possible frame: both markers around an empty payload.
pub const MIN_FRAME_LEN: usize = FRAME_PREFIX.len() + FRAME_SUFFIX.len();

/// Rotation applied by the text codec.
pub const SHIFT: u32 = 7;

/// Extensions handled by the pipeline (lowercase, without the dot).
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["txt", "jpg", "jpeg", "png", "mp4", "avi", "mov", "mkv"];

/// Image subset of [`SUPPORTED_EXTENSIONS`].
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Video subset of [`SUPPORTED_EXTENSIONS`].
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Text subset of [`SUPPORTED_EXTENSIONS`].
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// Suffix of the folder that receives every numbered copy.
pub const DEFAULT_COPIES_SUFFIX: &str = "-Copies";

/// Width of zero-padded order numbers.
pub const ORDER_NUMBER_WIDTH: usize = 3;

/// Swap pairs order number N with file number N + SWAP_OFFSET.
pub const SWAP_OFFSET: u32 = 10;

/// Default worker count for per-file work inside one copy.
pub const DEFAULT_WORKERS: usize = 4;

/// Upper bound on the worker pool.
pub const MAX_WORKERS: usize = 64;

/// Tunables for the batch pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Threads used for per-file watermark work inside one copy.
    pub workers: usize,

    /// Suffix appended to the source folder name for the copies root.
    pub copies_suffix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            copies_suffix: DEFAULT_COPIES_SUFFIX.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with a custom worker count.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.clamp(1, MAX_WORKERS),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| crate::Error::at_path(path, e))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate().map_err(crate::Error::InvalidConfig)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(format!("Workers must be between 1 and {}", MAX_WORKERS));
        }
        if self.copies_suffix.is_empty() {
            return Err("Copies suffix must not be empty".to_string());
        }
        if self.copies_suffix.contains(['/', '\\']) {
            return Err("Copies suffix must not contain path separators".to_string());
        }
        Ok(())
    }
}
