//! Watermark payload encoding.
//!
//! This module provides:
//! - The fixed-shift text codec used to obfuscate payloads
//! - Frame construction and the bounded tail scan

pub mod frame;
mod shift;

pub use frame::{build_frame, scan_tail, FrameLocation, TailScan};
pub use shift::{decode, encode};
