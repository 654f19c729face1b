//! Core of readaloud: turning free-form text into speakable, highlightable
//! units and the port through which those units reach a speech engine.
//!
//! - [`segmenter`] splits text into paragraphs and `.`-delimited sentence
//!   units, each tagged with the char span it occupies.
//! - [`position`] is the single serialization boundary between a position
//!   and the opaque [`UtteranceId`] an engine echoes back.
//! - [`ports`] defines the [`SpeechEngine`] contract.
//! - [`settings`] holds the reader configuration.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod position;
pub mod segmenter;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    CharSpan, InvalidLocale, Locale, ReadPosition, UtteranceId, UtteranceJob, UtterancePosition,
};
pub use ports::{
    EngineEventSender, EngineStartup, SpeechEngine, SpeechEngineFactory, UtteranceEvent,
};
pub use position::{DecodeError, decode_position, encode_position, translate};
pub use segmenter::{
    SentenceUnit, paragraphs_to_jobs, paragraphs_to_jobs_from, parse_position, split_to_ranges,
    text_to_paragraphs,
};
pub use settings::{
    DEFAULT_WORDS_PER_MINUTE, ReaderSettings, ReaderSettingsUpdate, SettingsError,
    default_locale_candidates, validate_settings,
};
