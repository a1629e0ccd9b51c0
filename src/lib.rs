//! Tailmark
//!
//! Embeds a covert text marker at the tail of media files, finds and removes
//! it again, and turns one source folder into many numbered, individually
//! marked copies.
//!
//! # Features
//!
//! - **Tail frames**: `<<==` + obfuscated text + `==>>` appended to a file,
//!   detected by a bounded scan of the last bytes
//! - **Text codec**: fixed-shift substitution over letters and digits
//! - **Batch copies**: numbered copies with optional photo swap, visible
//!   text and stored zip archives
//! - **CLI Interface**: batch, stamp, inspect and strip from the shell
//!
//! # Architecture
//!
//! ```text
//! BatchRequest → copy tree → embed frames (worker pool) → visible text → swap → zip
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use tailmark::batch::{BatchOrchestrator, BatchRequest, NullSink};
//! use tailmark::PipelineConfig;
//!
//! let orchestrator = BatchOrchestrator::new(PipelineConfig::default()).unwrap();
//! let mut request = BatchRequest::new("./Wedding-Bundle", 3, "ORDER 5");
//! request.create_zip = true;
//!
//! let report = orchestrator.run(&request, &NullSink).unwrap();
//! assert_eq!(report.order_numbers(), vec!["005", "006", "007"]);
//! ```

pub mod batch;
pub mod codec;
pub mod config;
pub mod error;
pub mod storage;

pub use batch::{BatchOrchestrator, BatchRequest};
pub use config::PipelineConfig;
pub use error::{Error, Result};
