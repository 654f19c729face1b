//! Shared CLI presentation utilities.
//!
//! # Guidelines
//!
//! - Keep this module format-only: no domain transforms
//! - Position decoding belongs in readaloud-core

pub mod highlight;

// Re-export commonly used items
pub use highlight::{ERROR_MARKERS, SPEAKING_MARKERS, highlight_span, render_position};
