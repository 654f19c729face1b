//! Render-side playback position.

use serde::{Deserialize, Serialize};

use super::CharSpan;

/// What the UI should highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReadPosition {
    /// Nothing has been spoken yet for the current text.
    #[default]
    NotStarted,

    /// A span of a paragraph is being (or failed to be) spoken.
    #[serde(rename_all = "camelCase")]
    Position {
        /// Index into the paragraph list.
        paragraph: usize,
        /// Highlighted chars of that paragraph, possibly empty.
        char_span: CharSpan,
        /// The engine reported a synthesis error for this span.
        is_error: bool,
    },
}

impl ReadPosition {
    /// Paragraph index, if playback has started.
    #[must_use]
    pub const fn paragraph(&self) -> Option<usize> {
        match self {
            Self::NotStarted => None,
            Self::Position { paragraph, .. } => Some(*paragraph),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        match self {
            Self::NotStarted => false,
            Self::Position { is_error, .. } => *is_error,
        }
    }
}
