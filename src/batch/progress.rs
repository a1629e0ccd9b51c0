//! Progress reporting, log events and cancellation.
//!
//! The pipeline never writes to a global console. Everything the caller
//! should see goes through an [`EventSink`] passed into each operation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fraction of a run that has completed, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ProgressReport {
    pub fraction: f32,
}

impl ProgressReport {
    /// Whether the run reached the end.
    pub fn is_complete(&self) -> bool {
        self.fraction >= 1.0
    }
}

/// Severity of a human-readable log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A human-readable line for the caller's console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// Event emitted by a running operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BatchEvent {
    Progress(ProgressReport),
    Log(LogLine),
}

/// Receiver for progress and log events.
///
/// Implementations must be cheap and thread-safe: per-file workers call into
/// the sink concurrently.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: BatchEvent);

    fn info(&self, message: String) {
        self.emit(BatchEvent::Log(LogLine {
            level: LogLevel::Info,
            message,
        }));
    }

    fn warn(&self, message: String) {
        self.emit(BatchEvent::Log(LogLine {
            level: LogLevel::Warn,
            message,
        }));
    }

    fn error(&self, message: String) {
        self.emit(BatchEvent::Log(LogLine {
            level: LogLevel::Error,
            message,
        }));
    }

    fn progress(&self, fraction: f32) {
        self.emit(BatchEvent::Progress(ProgressReport { fraction }));
    }
}

impl<F> EventSink for F
where
    F: Fn(BatchEvent) + Send + Sync,
{
    fn emit(&self, event: BatchEvent) {
        self(event)
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: BatchEvent) {}
}

/// Sink that keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<BatchEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far.
    pub fn events(&self) -> Vec<BatchEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Progress fractions in emission order.
    pub fn fractions(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::Progress(p) => Some(p.fraction),
                BatchEvent::Log(_) => None,
            })
            .collect()
    }

    /// Log messages in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BatchEvent::Log(line) => Some(line.message),
                BatchEvent::Progress(_) => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: BatchEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Shared step counter that turns completed steps into fractions.
#[derive(Debug)]
pub struct ProgressTracker {
    completed: AtomicUsize,
    total: usize,
}

impl ProgressTracker {
    /// Tracker for a run of `total` steps.
    pub fn new(total: usize) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one finished step and report the new fraction.
    ///
    /// The counter saturates at `total`, so the fraction never exceeds 1.0.
    /// Reports are only ordered when a single thread drives the tracker.
    pub fn advance(&self, sink: &dyn EventSink) -> f32 {
        let completed = self
            .completed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| {
                Some((c + 1).min(self.total))
            })
            .map(|previous| (previous + 1).min(self.total))
            .unwrap_or(self.total);
        let fraction = self.fraction_of(completed);
        sink.progress(fraction);
        fraction
    }

    /// Steps completed so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Total steps of the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Current fraction without advancing.
    pub fn fraction(&self) -> f32 {
        self.fraction_of(self.completed())
    }

    fn fraction_of(&self, completed: usize) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        if completed >= self.total {
            1.0
        } else {
            completed as f32 / self.total as f32
        }
    }
}

/// Cooperative cancellation flag shared between the caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop at the next check point.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
