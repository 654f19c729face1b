//! Speech engine port: the contract between playback coordination and a
//! concrete text-to-speech binding.
//!
//! The engine is modelled as two one-way channels:
//!
//! - **Commands** (coordinator → engine): the [`SpeechEngine`] methods.
//! - **Events** (engine → coordinator): [`UtteranceEvent`]s pushed into the
//!   [`EngineEventSender`] the engine was created with.
//!
//! Keeping callbacks on a channel means an engine can never re-enter the
//! coordinator while it holds its lock, and a fake engine can replay scripted
//! events in tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Locale, UtteranceId, UtteranceJob};

/// Progress notification for a single utterance, tagged with the id it was
/// submitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    /// The engine began speaking the utterance.
    Started(UtteranceId),

    /// The engine finished speaking the utterance.
    Done(UtteranceId),

    /// The engine failed to synthesize the utterance. Engines without
    /// detailed error codes report `code: None`; both are handled alike.
    Error {
        id: UtteranceId,
        code: Option<i32>,
    },
}

impl UtteranceEvent {
    /// The utterance this event refers to.
    #[must_use]
    pub const fn id(&self) -> &UtteranceId {
        match self {
            Self::Started(id) | Self::Done(id) | Self::Error { id, .. } => id,
        }
    }
}

/// Where an engine delivers its [`UtteranceEvent`]s.
pub type EngineEventSender = mpsc::UnboundedSender<UtteranceEvent>;

/// Result of engine start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStartup {
    /// The engine started and can accept utterances.
    pub ready: bool,

    /// Locales the engine can speak.
    pub supported_locales: BTreeSet<Locale>,
}

impl EngineStartup {
    /// A failed start-up.
    #[must_use]
    pub const fn failed() -> Self {
        Self {
            ready: false,
            supported_locales: BTreeSet::new(),
        }
    }

    /// A successful start-up with the given locales.
    #[must_use]
    pub fn ready(supported_locales: impl IntoIterator<Item = Locale>) -> Self {
        Self {
            ready: true,
            supported_locales: supported_locales.into_iter().collect(),
        }
    }
}

/// One session of an asynchronous, callback-driven speech engine.
///
/// All command methods take `&self` and must return promptly: `speak` only
/// enqueues, and speech happens on a thread owned by the engine. Events for an
/// id are only ever sent after that id was passed to `speak`.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Start the engine. Resolves once the engine reports success or failure.
    ///
    /// `candidates` is the caller's locale priority list, passed as a hint;
    /// the coordinator performs the actual negotiation from the returned
    /// `supported_locales`.
    async fn init(&self, candidates: &[Locale]) -> EngineStartup;

    /// Select the voice language for subsequent utterances.
    fn set_locale(&self, locale: &Locale);

    /// Enqueue a job behind any already queued ones.
    fn speak(&self, job: &UtteranceJob);

    /// Halt audio output and drop queued utterances.
    fn stop(&self);

    /// Whether audio is currently being produced.
    fn is_speaking(&self) -> bool;

    /// Release engine resources. Safe to call repeatedly, and after `stop`.
    fn shutdown(&self);
}

/// Creates engine sessions. Each session is bound to its own event channel.
pub trait SpeechEngineFactory: Send + Sync {
    fn create(&self, events: EngineEventSender) -> Arc<dyn SpeechEngine>;
}

impl<F> SpeechEngineFactory for F
where
    F: Fn(EngineEventSender) -> Arc<dyn SpeechEngine> + Send + Sync,
{
    fn create(&self, events: EngineEventSender) -> Arc<dyn SpeechEngine> {
        self(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_accessor() {
        let id = UtteranceId::echoed("x");
        assert_eq!(UtteranceEvent::Started(id.clone()).id(), &id);
        assert_eq!(UtteranceEvent::Done(id.clone()).id(), &id);
        assert_eq!(
            UtteranceEvent::Error {
                id: id.clone(),
                code: None
            }
            .id(),
            &id
        );
    }

    #[test]
    fn startup_constructors() {
        assert!(!EngineStartup::failed().ready);
        assert_eq!(EngineStartup::failed(), EngineStartup::default());

        let startup = EngineStartup::ready([
            Locale::parse("en-US").unwrap(),
            Locale::parse("en-us").unwrap(),
        ]);
        assert!(startup.ready);
        assert_eq!(startup.supported_locales.len(), 1);
    }
}
