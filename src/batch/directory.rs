//! Whole-directory operations: stamp, inspect, strip and stats.

use crate::batch::progress::{CancelFlag, EventSink, ProgressTracker};
use crate::batch::request::MarkStats;
use crate::error::Result;
use crate::storage::{
    add_watermark, extract_watermark_text, remove_watermark, supported_files, EmbedOutcome,
    FileKind, FileRecord,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Outcome of embedding into a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FileOutcome {
    Added,
    Duplicate,
    Failed,
    Skipped,
}

impl MarkStats {
    pub(crate) fn tally(outcomes: impl IntoIterator<Item = FileOutcome>) -> Self {
        let mut stats = MarkStats::default();
        for outcome in outcomes {
            match outcome {
                FileOutcome::Added => stats.added += 1,
                FileOutcome::Duplicate => stats.duplicates += 1,
                FileOutcome::Failed => stats.failed += 1,
                FileOutcome::Skipped => stats.skipped += 1,
            }
        }
        stats
    }
}

/// Embed `text` into one file, logging instead of failing.
pub(crate) fn mark_record(
    record: &FileRecord,
    text: &str,
    cancel: &CancelFlag,
    sink: &dyn EventSink,
) -> FileOutcome {
    if cancel.is_cancelled() {
        return FileOutcome::Skipped;
    }

    let name = record.name();
    match add_watermark(&record.path, text) {
        Ok(EmbedOutcome::Added { frame_len }) => {
            debug!(path = %record.path.display(), frame_len, "watermark added");
            if record.kind == FileKind::Video {
                sink.info(format!("Added watermark to video: {}", name));
            } else {
                sink.info(format!("{}: Watermark added successfully", name));
            }
            FileOutcome::Added
        }
        Ok(EmbedOutcome::Duplicate) => {
            sink.info(format!("{}: Already has watermark", name));
            FileOutcome::Duplicate
        }
        Err(e) => {
            error!(path = %record.path.display(), error = %e, "adding watermark failed");
            sink.error(format!("Error adding watermark to {}: {}", name, e));
            FileOutcome::Failed
        }
    }
}

/// Embed `text` into every supported file under `dir`.
pub fn stamp_directory(dir: &Path, text: &str, sink: &dyn EventSink) -> Result<MarkStats> {
    stamp_directory_with_cancel(dir, text, &CancelFlag::new(), sink)
}

/// [`stamp_directory`] with a caller-held cancellation flag.
pub fn stamp_directory_with_cancel(
    dir: &Path,
    text: &str,
    cancel: &CancelFlag,
    sink: &dyn EventSink,
) -> Result<MarkStats> {
    crate::codec::build_frame(text)?;
    let files = supported_files(dir)?;
    sink.info(format!("Found {} supported files", files.len()));

    let tracker = ProgressTracker::new(files.len());
    let stats = MarkStats::tally(files.iter().map(|record| {
        let outcome = mark_record(record, text, cancel, sink);
        tracker.advance(sink);
        outcome
    }));

    info!(
        dir = %dir.display(),
        added = stats.added,
        duplicates = stats.duplicates,
        failed = stats.failed,
        "stamp finished"
    );
    sink.info("Watermarking completed".to_string());
    Ok(stats)
}

/// A decoded watermark found during inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: PathBuf,
    pub kind: FileKind,
    pub text: String,
}

/// Extract and decode the watermark of every supported file under `dir`.
pub fn inspect_directory(dir: &Path, sink: &dyn EventSink) -> Result<Vec<Finding>> {
    let files = supported_files(dir)?;
    let tracker = ProgressTracker::new(files.len());
    let mut findings = Vec::new();

    for record in &files {
        match extract_watermark_text(&record.path) {
            Ok(Some(text)) => {
                sink.info(format!("{} → {}", record.name(), text));
                findings.push(Finding {
                    path: record.path.clone(),
                    kind: record.kind,
                    text,
                });
            }
            Ok(None) => {}
            Err(e) => {
                error!(path = %record.path.display(), error = %e, "reading watermark failed");
                sink.error(format!("Error processing {}: {}", record.name(), e));
            }
        }
        tracker.advance(sink);
    }

    if findings.is_empty() {
        sink.info("Completed: no watermarks found".to_string());
    } else {
        sink.info(format!(
            "Completed: scanned {} files, found {} watermarks",
            files.len(),
            findings.len()
        ));
    }
    Ok(findings)
}

/// Tallies of a strip pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StripStats {
    pub removed: usize,
    pub absent: usize,
    pub failed: usize,
}

/// Remove current-format frames from every image and video under `dir`.
///
/// Text files are left alone.
pub fn strip_directory(dir: &Path, sink: &dyn EventSink) -> Result<StripStats> {
    let files: Vec<FileRecord> = supported_files(dir)?
        .into_iter()
        .filter(|r| matches!(r.kind, FileKind::Image | FileKind::Video))
        .collect();
    let tracker = ProgressTracker::new(files.len());
    let mut stats = StripStats::default();

    for record in &files {
        match remove_watermark(&record.path) {
            Ok(true) => {
                stats.removed += 1;
                sink.info(format!("Watermark removed from {}", record.name()));
            }
            Ok(false) => {
                stats.absent += 1;
                sink.info(format!("No watermark found in {}", record.name()));
            }
            Err(e) => {
                stats.failed += 1;
                error!(path = %record.path.display(), error = %e, "removing watermark failed");
                sink.error(format!("Error processing {}: {}", record.name(), e));
            }
        }
        tracker.advance(sink);
    }

    sink.info("Watermark removal completed".to_string());
    Ok(stats)
}

/// Counts and sizes of the supported files under a directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStats {
    pub total_files: usize,
    pub images: usize,
    pub videos: usize,
    pub texts: usize,
    pub total_size: u64,
}

impl DirectoryStats {
    /// Human-readable total size.
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Count supported files under `dir` by kind and sum their sizes.
pub fn directory_stats(dir: &Path) -> Result<DirectoryStats> {
    let mut stats = DirectoryStats::default();
    for record in supported_files(dir)? {
        stats.total_files += 1;
        stats.total_size += record.size;
        match record.kind {
            FileKind::Image => stats.images += 1,
            FileKind::Video => stats.videos += 1,
            FileKind::Text => stats.texts += 1,
            FileKind::Unsupported => {}
        }
    }
    Ok(stats)
}

/// Format a byte count with one decimal in KB, MB or GB.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        b => format!("{} bytes", b),
    }
}
