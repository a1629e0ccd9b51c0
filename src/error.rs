//! Error types for tailmark.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tailmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while marking files or running a batch.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path.
    #[error("I/O error on {path}: {source}")]
    PathIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Zip archive error.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Source folder missing or not a directory.
    #[error("Source folder not found: {0}")]
    SourceNotFound(PathBuf),

    /// Batch request failed validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Pipeline configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Encoded frame would not fit in the scanned tail window.
    #[error("Watermark frame of {frame_len} bytes exceeds the {max} byte tail window")]
    PayloadTooLong { frame_len: usize, max: usize },

    /// Encoded text would produce a frame marker inside the payload.
    #[error("Watermark text {0:?} contains a frame marker")]
    PayloadContainsMarker(String),

    /// Copying the source tree for one order failed. Aborts the batch.
    #[error("Directory copy failed for order {order_number}: {source}")]
    CopyFailed {
        order_number: String,
        #[source]
        source: Box<Error>,
    },

    /// Writing or finalising an archive failed. Aborts the batch.
    #[error("Archive write failed for {path}: {source}")]
    ArchiveFailed {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// The visible-watermark renderer reported a failure.
    #[error("Visible watermark rendering failed: {0}")]
    Render(String),

    /// The run was cancelled by the caller.
    #[error("Batch cancelled after {completed} of {total} copies")]
    Cancelled { completed: usize, total: usize },

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Attach a path to a bare I/O error.
    pub fn at_path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::PathIo {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must stop a batch run rather than skip one file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CopyFailed { .. }
                | Error::ArchiveFailed { .. }
                | Error::Cancelled { .. }
                | Error::SourceNotFound(_)
                | Error::InvalidRequest(_)
                | Error::InvalidConfig(_)
                | Error::WorkerPool(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Error::WorkerPool(e.to_string())
    }
}
