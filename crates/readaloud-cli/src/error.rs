//! CLI-specific error types and mappings.
//!
//! This module provides the error type for the CLI adapter and mappings
//! from settings and playback errors to exit codes.

use readaloud_core::SettingsError;
use readaloud_speech::SpeechError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument combination that cannot be honored.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The speech engine could not be started.
    #[error("Speech unavailable: {0}")]
    Unavailable(String),

    /// Playback error.
    #[error("{0}")]
    Playback(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Playback(_) => 1,
            Self::Arguments(_) => 2,   // EX_USAGE
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<SpeechError> for CliError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::EngineStartFailed | SpeechError::NoSupportedLocale(_) => {
                Self::Unavailable(err.to_string())
            }
            SpeechError::ParagraphOutOfRange { .. } => Self::Arguments(err.to_string()),
            SpeechError::Superseded | SpeechError::NotReady => Self::Playback(err.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
