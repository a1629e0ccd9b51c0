//! Batch request and per-copy job description.

use crate::batch::numbering::{base_prefix, extract_start_number, format_order_number};
use crate::batch::swap::SwapOutcome;
use crate::batch::visible::VisibleOutcome;
use crate::codec::build_frame;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the caller asks of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Directory to copy.
    pub source_folder: PathBuf,
    /// Number of numbered copies, at least 1.
    pub num_copies: usize,
    /// Watermark text; a trailing number sets the first order number.
    pub base_text: String,
    /// Exchange photo N with photo N + 10 in each copy.
    #[serde(default)]
    pub add_swap: bool,
    /// Draw visible text on one photo in each copy.
    #[serde(default)]
    pub add_watermark: bool,
    /// Replace each finished copy with a stored zip.
    #[serde(default)]
    pub create_zip: bool,
    /// Visible text override; defaults to the order number.
    #[serde(default)]
    pub watermark_text: Option<String>,
    /// Photo number override; defaults to the order number.
    #[serde(default)]
    pub photo_number: Option<u32>,
}

impl BatchRequest {
    /// A request with every optional step disabled.
    pub fn new(
        source_folder: impl Into<PathBuf>,
        num_copies: usize,
        base_text: impl Into<String>,
    ) -> Self {
        Self {
            source_folder: source_folder.into(),
            num_copies,
            base_text: base_text.into(),
            add_swap: false,
            add_watermark: false,
            create_zip: false,
            watermark_text: None,
            photo_number: None,
        }
    }

    /// First order number, from the trailing digits of `base_text`.
    pub fn start_number(&self) -> u32 {
        extract_start_number(&self.base_text)
    }

    /// `base_text` without its trailing number.
    pub fn base_prefix(&self) -> &str {
        base_prefix(&self.base_text)
    }

    /// Number of progress steps in a full run.
    pub fn total_steps(&self) -> usize {
        let optional = [self.add_watermark, self.add_swap, self.create_zip]
            .iter()
            .filter(|enabled| **enabled)
            .count();
        self.num_copies * (2 + optional)
    }

    /// Check the request before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.num_copies == 0 {
            return Err(Error::InvalidRequest(
                "number of copies must be greater than 0".to_string(),
            ));
        }
        if self.source_folder.file_name().is_none() {
            return Err(Error::InvalidRequest(format!(
                "source folder {} has no name",
                self.source_folder.display()
            )));
        }
        let overflow = || Error::InvalidRequest("order numbers overflow".to_string());
        let extra = u32::try_from(self.num_copies - 1).map_err(|_| overflow())?;
        let last = self.start_number().checked_add(extra).ok_or_else(overflow)?;
        build_frame(&self.payload_text(&format_order_number(last)))?;
        Ok(())
    }

    /// Invisible watermark text for one order.
    pub fn payload_text(&self, order_number: &str) -> String {
        format!("{} {}", self.base_prefix(), order_number)
    }

    /// Describe copy `index` (0-based) of this run under `copies_root`.
    pub fn plan_copy(&self, index: usize, copies_root: &std::path::Path) -> CopyJob {
        let value = self.start_number().saturating_add(index as u32);
        let order_number = format_order_number(value);
        let source_name = self
            .source_folder
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let destination_dir = copies_root.join(&order_number).join(source_name);

        let visible = self.add_watermark.then(|| VisibleTarget {
            photo_number: self.photo_number.unwrap_or(value),
            text: self
                .watermark_text
                .clone()
                .unwrap_or_else(|| order_number.clone()),
        });

        CopyJob {
            watermark_text: self.payload_text(&order_number),
            order_number,
            order_value: value,
            destination_dir,
            visible,
            swap: self.add_swap,
        }
    }
}

/// Visible watermark parameters resolved for one copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleTarget {
    pub photo_number: u32,
    pub text: String,
}

/// One numbered copy of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    /// Zero-padded order number, e.g. `"005"`.
    pub order_number: String,
    /// Numeric value of the order number.
    pub order_value: u32,
    /// `<source>-Copies/<NNN>/<sourceName>`.
    pub destination_dir: PathBuf,
    /// Invisible watermark plaintext.
    pub watermark_text: String,
    pub visible: Option<VisibleTarget>,
    pub swap: bool,
}

/// Per-file tallies of an embed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkStats {
    pub added: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// What happened to one copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub order_number: String,
    /// Final location: the copy directory, or its zip when archived.
    pub output: PathBuf,
    pub marks: MarkStats,
    pub visible: Option<VisibleOutcome>,
    pub swap: Option<SwapOutcome>,
}

/// Result of a successful batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// `<source>-Copies`.
    pub copies_root: PathBuf,
    pub copies: Vec<CopyReport>,
}

impl BatchReport {
    /// Order numbers produced, in run order.
    pub fn order_numbers(&self) -> Vec<&str> {
        self.copies.iter().map(|c| c.order_number.as_str()).collect()
    }
}
