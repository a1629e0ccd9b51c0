//! Numbered copy creation: copy, mark, visible text, swap, archive.

use crate::batch::directory::{mark_record, FileOutcome};
use crate::batch::progress::{CancelFlag, EventSink, ProgressTracker};
use crate::batch::request::{BatchReport, BatchRequest, CopyJob, CopyReport, MarkStats};
use crate::batch::swap::{swap_pair, SwapOutcome};
use crate::batch::visible::{mark_photo, UnavailableMarker, VisibleMarker, VisibleOutcome};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::storage::{copy_tree, file_name, remove_tree, supported_files, write_stored_archive};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives a batch run.
///
/// Copies are processed strictly in order. Inside one copy the embed pass
/// runs on a bounded worker pool, and the visible-text and swap steps only
/// start once every file of that copy is done.
pub struct BatchOrchestrator {
    config: PipelineConfig,
    marker: Arc<dyn VisibleMarker>,
    cancel: CancelFlag,
    pool: ThreadPool,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl BatchOrchestrator {
    /// Create an orchestrator with no visible-text renderer.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("tailmark-worker-{}", i))
            .build()?;

        Ok(Self {
            config,
            marker: Arc::new(UnavailableMarker),
            cancel: CancelFlag::new(),
            pool,
        })
    }

    /// Use `marker` for visible text.
    pub fn with_marker(mut self, marker: Arc<dyn VisibleMarker>) -> Self {
        self.marker = marker;
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Flag that stops the run at the next check point.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Folder that receives every copy: `<parent>/<name><suffix>`.
    pub fn copies_root(&self, source: &Path) -> Result<PathBuf> {
        let parent = source.parent().ok_or_else(|| {
            Error::InvalidRequest(format!("{} has no parent folder", source.display()))
        })?;
        let mut name = source
            .file_name()
            .ok_or_else(|| Error::InvalidRequest(format!("{} has no name", source.display())))?
            .to_os_string();
        name.push(&self.config.copies_suffix);
        Ok(parent.join(name))
    }

    /// Run a full batch.
    ///
    /// Per-file failures, a missing visible-text photo and an incomplete swap
    /// pair are logged and skipped. A failed directory copy, a failed archive
    /// or cancellation stops the run and is returned after being logged;
    /// copies finished before that stay on disk.
    pub fn run(&self, request: &BatchRequest, sink: &dyn EventSink) -> Result<BatchReport> {
        request.validate()?;
        if !request.source_folder.is_dir() {
            return Err(Error::SourceNotFound(request.source_folder.clone()));
        }

        let copies_root = self.copies_root(&request.source_folder)?;
        std::fs::create_dir_all(&copies_root).map_err(|e| Error::at_path(&copies_root, e))?;

        info!(
            source = %request.source_folder.display(),
            copies = request.num_copies,
            start = request.start_number(),
            "batch started"
        );

        let tracker = ProgressTracker::new(request.total_steps());
        let mut copies = Vec::with_capacity(request.num_copies);

        for index in 0..request.num_copies {
            self.check_cancelled(index, request.num_copies, sink)?;
            let job = request.plan_copy(index, &copies_root);
            let report = self
                .process_copy(index, &job, request, &tracker, sink)
                .map_err(|e| fail(e, sink))?;
            copies.push(report);
        }

        if request.create_zip {
            for (archived, report) in copies.iter_mut().enumerate() {
                self.check_cancelled(archived, request.num_copies, sink)?;
                report.output = archive_copy(&report.output, sink).map_err(|e| fail(e, sink))?;
                tracker.advance(sink);
            }
        }

        info!(copies_root = %copies_root.display(), "batch finished");
        sink.info("Batch processing completed successfully".to_string());
        Ok(BatchReport {
            copies_root,
            copies,
        })
    }

    fn process_copy(
        &self,
        index: usize,
        job: &CopyJob,
        request: &BatchRequest,
        tracker: &ProgressTracker,
        sink: &dyn EventSink,
    ) -> Result<CopyReport> {
        copy_tree(&request.source_folder, &job.destination_dir).map_err(|e| Error::CopyFailed {
            order_number: job.order_number.clone(),
            source: Box::new(e),
        })?;
        sink.info(format!("Directory copied: {}", job.order_number));
        tracker.advance(sink);

        let marks = self.mark_copy(job, sink);
        self.check_cancelled(index, request.num_copies, sink)?;
        tracker.advance(sink);

        let visible = match &job.visible {
            Some(target) => {
                let outcome = self.visible_step(job, target.photo_number, &target.text, sink);
                tracker.advance(sink);
                outcome
            }
            None => None,
        };

        let swap = if job.swap {
            let outcome = self.swap_step(job, sink);
            tracker.advance(sink);
            outcome
        } else {
            None
        };

        sink.info(format!("Processed folder: {}", job.order_number));
        Ok(CopyReport {
            order_number: job.order_number.clone(),
            output: job.destination_dir.clone(),
            marks,
            visible,
            swap,
        })
    }

    /// Embed the copy's watermark into every supported file.
    ///
    /// Returns once all workers are done, which is the barrier the later
    /// steps rely on.
    fn mark_copy(&self, job: &CopyJob, sink: &dyn EventSink) -> MarkStats {
        let files = match supported_files(&job.destination_dir) {
            Ok(files) => files,
            Err(e) => {
                error!(order_number = %job.order_number, error = %e, "listing copy failed");
                sink.error(format!("Error scanning directory: {}", e));
                return MarkStats::default();
            }
        };

        let text = job.watermark_text.as_str();
        let cancel = &self.cancel;
        let outcomes: Vec<FileOutcome> = self.pool.install(|| {
            files
                .par_iter()
                .map(|record| mark_record(record, text, cancel, sink))
                .collect()
        });

        let stats = MarkStats::tally(outcomes);
        info!(
            order_number = %job.order_number,
            added = stats.added,
            duplicates = stats.duplicates,
            failed = stats.failed,
            "copy marked"
        );
        stats
    }

    fn visible_step(
        &self,
        job: &CopyJob,
        photo_number: u32,
        text: &str,
        sink: &dyn EventSink,
    ) -> Option<VisibleOutcome> {
        match mark_photo(&job.destination_dir, text, photo_number, self.marker.as_ref(), sink) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(order_number = %job.order_number, error = %e, "visible watermark failed");
                sink.error(format!("Error adding visible watermark: {}", e));
                None
            }
        }
    }

    fn swap_step(&self, job: &CopyJob, sink: &dyn EventSink) -> Option<SwapOutcome> {
        match swap_pair(&job.destination_dir, job.order_value, sink) {
            Ok(outcome) => {
                if matches!(outcome, SwapOutcome::Swapped { .. }) {
                    sink.info(format!(
                        "Finished swap operation for folder {}",
                        file_name(&job.destination_dir)
                    ));
                }
                Some(outcome)
            }
            Err(e) => {
                warn!(order_number = %job.order_number, error = %e, "swap failed");
                sink.error(format!("Error during swap operation: {}", e));
                None
            }
        }
    }

    fn check_cancelled(&self, completed: usize, total: usize, sink: &dyn EventSink) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!(completed, total, "batch cancelled");
            sink.warn(format!("Batch cancelled after {} of {} copies", completed, total));
            return Err(Error::Cancelled { completed, total });
        }
        Ok(())
    }
}

/// Replace a copy directory by `<dir>.zip` and return the archive path.
fn archive_copy(dir: &Path, sink: &dyn EventSink) -> Result<PathBuf> {
    let summary = write_stored_archive(dir).map_err(|e| Error::ArchiveFailed {
        path: dir.to_path_buf(),
        source: Box::new(e),
    })?;
    remove_tree(dir).map_err(|e| Error::ArchiveFailed {
        path: dir.to_path_buf(),
        source: Box::new(e),
    })?;
    info!(archive = %summary.path.display(), files = summary.files, "copy archived");
    sink.info(format!("Created ZIP archive: {}", summary.path.display()));
    Ok(summary.path)
}

/// Log a run-stopping error before handing it back.
fn fail(e: Error, sink: &dyn EventSink) -> Error {
    if !matches!(e, Error::Cancelled { .. }) {
        error!(error = %e, "batch processing failed");
        sink.error(format!("Error during batch processing: {}", e));
    }
    e
}
