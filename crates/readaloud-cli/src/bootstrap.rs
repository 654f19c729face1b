//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where the reader is wired together for the
//! CLI adapter:
//! - Reader settings (settings file, then command-line overrides)
//! - The console speech engine factory (via readaloud-speech)
//! - The playback coordinator and reader session on top of it

use std::sync::Arc;

use readaloud_core::{ReaderSettings, ReaderSettingsUpdate, validate_settings};
use readaloud_speech::{
    ConsoleEngineConfig, ConsoleEngineFactory, CoordinatorConfig, PlaybackCoordinator,
    ReaderSession,
};

use crate::error::CliError;
use crate::parser::Cli;

/// Build the effective settings for this invocation.
///
/// Values from `--config` are loaded first; flags and `READALOUD_*`
/// environment variables override them.
pub fn resolve_settings(cli: &Cli) -> Result<ReaderSettings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => ReaderSettings::load_from_file(path)?,
        None => ReaderSettings::default(),
    };

    let update = ReaderSettingsUpdate {
        words_per_minute: cli.words_per_minute.map(Some),
        locale_candidates: (!cli.locales.is_empty()).then(|| Some(cli.locales.clone())),
        ..Default::default()
    };
    settings.merge(&update);
    validate_settings(&settings)?;

    tracing::debug!(?settings, "Resolved reader settings");
    Ok(settings)
}

/// Compose a reader session backed by the console engine.
///
/// Must be called from within a tokio runtime.
pub fn bootstrap(settings: &ReaderSettings) -> ReaderSession {
    let factory = ConsoleEngineFactory::new(ConsoleEngineConfig::from_settings(settings));
    let (coordinator, errors) =
        PlaybackCoordinator::new(Arc::new(factory), CoordinatorConfig::from_settings(settings));
    ReaderSession::new(Arc::new(coordinator), errors)
}
