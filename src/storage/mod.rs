//! Storage layer for files on disk.
//!
//! This module handles:
//! - Classifying files by extension
//! - Embedding, reading and stripping tail frames
//! - Copying and removing directory trees
//! - Writing stored zip archives

pub mod archive;
pub mod classifier;
pub mod tree;
pub mod watermark;

pub use archive::{is_excluded, write_archive, write_stored_archive, ArchiveSummary};
pub use classifier::{classify, file_name, supported_files, FileKind, FileRecord};
pub use tree::{copy_tree, remove_tree};
pub use watermark::{
    add_watermark, extract_watermark_text, has_watermark, remove_watermark, EmbedOutcome,
};
