//! Playback error types.

/// Errors surfaced by the playback coordinator and the reader session.
///
/// Per-utterance failures (synthesis errors, orphan callbacks, undecodable
/// ids) never show up here: they are absorbed into published state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// The engine reported a failed start-up.
    #[error("Speech engine failed to start")]
    EngineStartFailed,

    /// None of the candidate locales is supported by both the engine and the
    /// platform.
    #[error("No supported locale among candidates: {0}")]
    NoSupportedLocale(String),

    /// A newer `init()` replaced this session before it became ready.
    #[error("Speech session was superseded by a newer initialization")]
    Superseded,

    /// The operation needs a ready session.
    #[error("Speech engine is not ready")]
    NotReady,

    /// Playback was requested from a paragraph that does not exist.
    #[error("Paragraph {index} is out of range ({count} paragraphs)")]
    ParagraphOutOfRange { index: usize, count: usize },
}

impl SpeechError {
    /// Whether the error leaves the coordinator without a usable session.
    pub const fn is_initialization_failure(&self) -> bool {
        matches!(self, Self::EngineStartFailed | Self::NoSupportedLocale(_))
    }
}
