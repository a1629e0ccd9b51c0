//! Visible text on a numbered photo.
//!
//! Rendering pixels is left to a [`VisibleMarker`] supplied by the caller;
//! this module only finds the target photo and reports the outcome.

use crate::batch::numbering::extract_file_number;
use crate::batch::progress::EventSink;
use crate::error::{Error, Result};
use crate::storage::{file_name, supported_files, FileKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where the renderer should place the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPosition {
    TopLeft,
    TopRight,
    Center,
    BottomLeft,
    #[default]
    BottomRight,
}

/// Capability that draws text onto an image file in place.
pub trait VisibleMarker: Send + Sync {
    fn render(&self, image: &Path, text: &str, position: TextPosition) -> Result<()>;
}

/// Marker used when no renderer is available. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableMarker;

impl VisibleMarker for UnavailableMarker {
    fn render(&self, image: &Path, _text: &str, _position: TextPosition) -> Result<()> {
        Err(Error::Render(format!(
            "no renderer configured for {}",
            image.display()
        )))
    }
}

/// Result of a visible-watermark step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibleOutcome {
    /// Text was drawn on this image.
    Rendered(PathBuf),
    /// No image carries the requested number.
    NotFound { photo_number: u32 },
}

/// First image under `dir` whose file number equals `photo_number`.
pub fn find_photo(dir: &Path, photo_number: u32) -> Result<Option<PathBuf>> {
    Ok(supported_files(dir)?
        .into_iter()
        .filter(|r| r.kind == FileKind::Image)
        .find(|r| extract_file_number(&r.name()) == Some(photo_number))
        .map(|r| r.path))
}

/// Draw `text` on the photo numbered `photo_number` under `dir`.
///
/// A missing photo is reported, not treated as an error. Renderer failures
/// are returned to the caller.
pub fn mark_photo(
    dir: &Path,
    text: &str,
    photo_number: u32,
    marker: &dyn VisibleMarker,
    sink: &dyn EventSink,
) -> Result<VisibleOutcome> {
    let Some(photo) = find_photo(dir, photo_number)? else {
        warn!(dir = %dir.display(), photo_number, "no photo for visible watermark");
        sink.warn(format!(
            "No photo with number {} found in {}",
            photo_number,
            file_name(dir)
        ));
        return Ok(VisibleOutcome::NotFound { photo_number });
    };

    marker.render(&photo, text, TextPosition::default())?;
    info!(path = %photo.display(), "visible watermark rendered");
    sink.info(format!("Added visible watermark to {}", file_name(&photo)));
    Ok(VisibleOutcome::Rendered(photo))
}
