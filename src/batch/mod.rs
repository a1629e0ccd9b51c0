//! Batch orchestration over a source directory.
//!
//! Produces numbered copies of a folder, each carrying its own invisible
//! watermark, with optional visible text, photo swapping and zip archival.
//! The single-directory operations (stamp, inspect, strip) live here too.

mod directory;
mod numbering;
mod orchestrator;
mod progress;
mod request;
mod swap;
mod visible;

pub use directory::{
    directory_stats, format_size, inspect_directory, stamp_directory,
    stamp_directory_with_cancel, strip_directory, DirectoryStats, Finding, StripStats,
};
pub use numbering::{
    base_prefix, extract_file_number, extract_start_number, format_order_number, order_numbers,
};
pub use orchestrator::BatchOrchestrator;
pub use progress::{
    BatchEvent, CancelFlag, EventSink, LogLevel, LogLine, MemorySink, NullSink, ProgressReport,
    ProgressTracker,
};
pub use request::{BatchReport, BatchRequest, CopyJob, CopyReport, MarkStats, VisibleTarget};
pub use swap::{swap_files, swap_pair, SwapOutcome};
pub use visible::{
    find_photo, mark_photo, TextPosition, UnavailableMarker, VisibleMarker, VisibleOutcome,
};
