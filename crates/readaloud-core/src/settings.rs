//! Settings domain types and validation.
//!
//! This module contains the reader settings shared by the coordinator, the
//! console engine and the CLI. These are pure domain types; the only I/O is
//! [`ReaderSettings::load_from_file`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::Locale;

/// Default speaking rate of the console engine.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 180;

/// Accepted speaking-rate range.
pub const WORDS_PER_MINUTE_RANGE: std::ops::RangeInclusive<u32> = 40..=1000;

/// Locales tried after the system default, highest priority first.
pub const FALLBACK_LOCALE_TAGS: [&str; 3] = ["he-IL", "en-US", "en"];

/// Locales the built-in console engine claims to speak.
pub const DEFAULT_ENGINE_LOCALE_TAGS: [&str; 4] = ["en", "en-US", "en-GB", "he-IL"];

/// Reader settings.
///
/// All fields are optional to support partial files and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderSettings {
    /// Locale priority list for engine negotiation.
    pub locale_candidates: Option<Vec<Locale>>,

    /// Locales present on the platform. `None` accepts any locale the engine
    /// supports.
    pub platform_locales: Option<Vec<Locale>>,

    /// Speaking rate used by the console engine to pace utterances.
    pub words_per_minute: Option<u32>,

    /// Locales the console engine reports as supported.
    pub engine_locales: Option<Vec<Locale>>,
}

impl ReaderSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            locale_candidates: Some(default_locale_candidates()),
            platform_locales: None,
            words_per_minute: Some(DEFAULT_WORDS_PER_MINUTE),
            engine_locales: Some(parse_tags(&DEFAULT_ENGINE_LOCALE_TAGS)),
        }
    }

    /// Read settings from a JSON file. Missing fields fall back to `None`.
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings: Self = serde_json::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        validate_settings(&settings)?;
        tracing::debug!(path = %path.display(), "Loaded reader settings");
        Ok(settings)
    }

    /// Get the effective locale priority list (with default fallback).
    #[must_use]
    pub fn effective_locale_candidates(&self) -> Vec<Locale> {
        self.locale_candidates
            .clone()
            .unwrap_or_else(default_locale_candidates)
    }

    /// Get the effective speaking rate (with default fallback).
    #[must_use]
    pub const fn effective_words_per_minute(&self) -> u32 {
        match self.words_per_minute {
            Some(wpm) => wpm,
            None => DEFAULT_WORDS_PER_MINUTE,
        }
    }

    /// Get the effective console-engine locales (with default fallback).
    #[must_use]
    pub fn effective_engine_locales(&self) -> Vec<Locale> {
        self.engine_locales
            .clone()
            .unwrap_or_else(|| parse_tags(&DEFAULT_ENGINE_LOCALE_TAGS))
    }

    /// Merge an update into these settings, only touching fields that are Some.
    pub fn merge(&mut self, other: &ReaderSettingsUpdate) {
        if let Some(ref candidates) = other.locale_candidates {
            self.locale_candidates.clone_from(candidates);
        }
        if let Some(ref platform) = other.platform_locales {
            self.platform_locales.clone_from(platform);
        }
        if let Some(ref wpm) = other.words_per_minute {
            self.words_per_minute = *wpm;
        }
        if let Some(ref engine) = other.engine_locales {
            self.engine_locales.clone_from(engine);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset field to its default
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderSettingsUpdate {
    pub locale_candidates: Option<Option<Vec<Locale>>>,
    pub platform_locales: Option<Option<Vec<Locale>>>,
    pub words_per_minute: Option<Option<u32>>,
    pub engine_locales: Option<Option<Vec<Locale>>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error(
        "Words per minute must be between {} and {}, got {0}",
        WORDS_PER_MINUTE_RANGE.start(),
        WORDS_PER_MINUTE_RANGE.end()
    )]
    InvalidWordsPerMinute(u32),

    #[error("Locale candidate list cannot be empty")]
    EmptyLocaleCandidates,

    #[error("Engine locale list cannot be empty")]
    EmptyEngineLocales,

    #[error("Failed to read settings file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse settings file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &ReaderSettings) -> Result<(), SettingsError> {
    if let Some(wpm) = settings.words_per_minute {
        if !WORDS_PER_MINUTE_RANGE.contains(&wpm) {
            return Err(SettingsError::InvalidWordsPerMinute(wpm));
        }
    }

    if settings
        .locale_candidates
        .as_ref()
        .is_some_and(Vec::is_empty)
    {
        return Err(SettingsError::EmptyLocaleCandidates);
    }

    if settings.engine_locales.as_ref().is_some_and(Vec::is_empty) {
        return Err(SettingsError::EmptyEngineLocales);
    }

    Ok(())
}

/// System default locale followed by [`FALLBACK_LOCALE_TAGS`], without
/// duplicates.
#[must_use]
pub fn default_locale_candidates() -> Vec<Locale> {
    let mut candidates: Vec<Locale> = Locale::system_default().into_iter().collect();
    for locale in parse_tags(&FALLBACK_LOCALE_TAGS) {
        if !candidates.contains(&locale) {
            candidates.push(locale);
        }
    }
    candidates
}

fn parse_tags(tags: &[&str]) -> Vec<Locale> {
    tags.iter().filter_map(|tag| Locale::parse(tag).ok()).collect()
}
