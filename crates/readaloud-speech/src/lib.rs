//! Speech playback for readaloud.
//!
//! [`PlaybackCoordinator`] drives a callback-based [`SpeechEngine`] through a
//! queue of utterance jobs and publishes the job being spoken.
//! [`ReaderSession`] sits on top and turns that into a read position over the
//! submitted text. [`ConsoleEngine`] is a paced engine that needs no audio
//! device.
//!
//! [`SpeechEngine`]: readaloud_core::SpeechEngine

#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings; used by the integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

pub mod console_engine;
pub mod coordinator;
pub mod error;
pub mod locale;
pub mod reader;

// Re-export key types for convenience
pub use console_engine::{ConsoleEngine, ConsoleEngineConfig, ConsoleEngineFactory};
pub use coordinator::{
    CoordinatorConfig, PlaybackCoordinator, PlaybackState, SessionState, UtteranceFailure,
};
pub use error::SpeechError;
pub use locale::negotiate_locale;
pub use reader::{ReaderSession, ReaderState};
