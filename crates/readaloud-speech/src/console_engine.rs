//! Console speech engine: a paced stand-in for a platform TTS binding.
//!
//! Utterances are "spoken" by holding each one for as long as it would take
//! to read aloud at the configured rate. A dedicated OS thread owns the
//! utterance queue and reports progress through the engine event channel,
//! so the engine behaves like a real callback-driven TTS service: `speak`
//! returns immediately and events arrive from another thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use readaloud_core::{
    EngineEventSender, EngineStartup, Locale, ReaderSettings, SpeechEngine, SpeechEngineFactory,
    UtteranceEvent, UtteranceId, UtteranceJob,
};

/// Error code reported for utterances longer than
/// [`ConsoleEngineConfig::max_input_chars`].
pub const ERROR_INPUT_TOO_LONG: i32 = -8;

/// Longest utterance accepted by default, in chars.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 4000;

/// Console engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEngineConfig {
    /// Speaking rate used to pace utterances.
    pub words_per_minute: u32,

    /// Locales reported from start-up.
    pub supported_locales: Vec<Locale>,

    /// Utterances longer than this fail with [`ERROR_INPUT_TOO_LONG`].
    pub max_input_chars: usize,
}

impl Default for ConsoleEngineConfig {
    fn default() -> Self {
        Self::from_settings(&ReaderSettings::default())
    }
}

impl ConsoleEngineConfig {
    #[must_use]
    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            words_per_minute: settings.effective_words_per_minute(),
            supported_locales: settings.effective_engine_locales(),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

/// How long an utterance takes at `words_per_minute`. At least one word is
/// always counted.
pub fn utterance_duration(text: &str, words_per_minute: u32) -> Duration {
    let words = text.split_whitespace().count().max(1) as u64;
    Duration::from_millis(words * 60_000 / u64::from(words_per_minute.max(1)))
}

// ── Commands ───────────────────────────────────────────────────────

enum EngineCommand {
    SetLocale(Locale),
    Speak(UtteranceJob),
    /// Drop the queue and the utterance in progress without reporting them.
    Stop,
    Shutdown,
}

// ── Engine handle ──────────────────────────────────────────────────

/// `Send + Sync` handle to the speaking thread.
pub struct ConsoleEngine {
    config: ConsoleEngineConfig,
    cmd_tx: mpsc::Sender<EngineCommand>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    speaking: Arc<AtomicBool>,
}

impl ConsoleEngine {
    /// Spawn the speaking thread. A thread that cannot be spawned shows up as
    /// a failed start-up from [`SpeechEngine::init`].
    pub fn spawn(config: ConsoleEngineConfig, events: EngineEventSender) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let speaking = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            events,
            speaking: Arc::clone(&speaking),
            words_per_minute: config.words_per_minute,
            max_input_chars: config.max_input_chars,
        };
        let thread = thread::Builder::new()
            .name("readaloud-speech".into())
            .spawn(move || worker.run(&cmd_rx))
            .map_err(|e| tracing::error!(error = %e, "Failed to spawn speech thread"))
            .ok();

        Self {
            config,
            cmd_tx,
            thread: Mutex::new(thread),
            speaking,
        }
    }

    fn send(&self, command: EngineCommand) {
        // The thread is gone after shutdown; late commands are dropped.
        let _ = self.cmd_tx.send(command);
    }

    fn is_running(&self) -> bool {
        self.thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[async_trait]
impl SpeechEngine for ConsoleEngine {
    async fn init(&self, candidates: &[Locale]) -> EngineStartup {
        if !self.is_running() {
            return EngineStartup::failed();
        }
        tracing::debug!(
            candidates = candidates.len(),
            supported = self.config.supported_locales.len(),
            "Console speech engine started"
        );
        EngineStartup::ready(self.config.supported_locales.iter().cloned())
    }

    fn set_locale(&self, locale: &Locale) {
        self.send(EngineCommand::SetLocale(locale.clone()));
    }

    fn speak(&self, job: &UtteranceJob) {
        self.send(EngineCommand::Speak(job.clone()));
    }

    fn stop(&self) {
        self.speaking.store(false, Ordering::SeqCst);
        self.send(EngineCommand::Stop);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn shutdown(&self) {
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            self.send(EngineCommand::Shutdown);
            let _ = handle.join();
        }
    }
}

impl Drop for ConsoleEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Speaking thread ────────────────────────────────────────────────

struct Worker {
    events: EngineEventSender,
    speaking: Arc<AtomicBool>,
    words_per_minute: u32,
    max_input_chars: usize,
}

impl Worker {
    fn run(self, cmd_rx: &mpsc::Receiver<EngineCommand>) {
        let mut queue: VecDeque<UtteranceJob> = VecDeque::new();
        let mut current: Option<(UtteranceId, Instant)> = None;
        let mut locale: Option<Locale> = None;

        loop {
            if current.is_none() {
                current = self.start_next(&mut queue, locale.as_ref());
                self.speaking.store(current.is_some(), Ordering::SeqCst);
            }

            let command = match &current {
                Some((_, deadline)) => {
                    match cmd_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match cmd_rx.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };

            match command {
                None => {
                    if let Some((id, _)) = current.take() {
                        let _ = self.events.send(UtteranceEvent::Done(id));
                    }
                }
                Some(EngineCommand::SetLocale(next)) => locale = Some(next),
                Some(EngineCommand::Speak(job)) => queue.push_back(job),
                Some(EngineCommand::Stop) => {
                    queue.clear();
                    current = None;
                    self.speaking.store(false, Ordering::SeqCst);
                }
                Some(EngineCommand::Shutdown) => break,
            }
        }

        self.speaking.store(false, Ordering::SeqCst);
        tracing::debug!("Speech thread shutting down");
    }

    /// Begin the next speakable job, failing any that are too long.
    fn start_next(
        &self,
        queue: &mut VecDeque<UtteranceJob>,
        locale: Option<&Locale>,
    ) -> Option<(UtteranceId, Instant)> {
        while let Some(job) = queue.pop_front() {
            let chars = job.text.chars().count();
            if chars > self.max_input_chars {
                tracing::warn!(id = %job.id, chars, "Utterance exceeds engine input limit");
                let _ = self.events.send(UtteranceEvent::Error {
                    id: job.id,
                    code: Some(ERROR_INPUT_TOO_LONG),
                });
                continue;
            }

            let duration = utterance_duration(&job.text, self.words_per_minute);
            tracing::debug!(
                locale = locale.map(ToString::to_string),
                ?duration,
                text = %job.text,
                "Speaking"
            );
            let _ = self.events.send(UtteranceEvent::Started(job.id.clone()));
            return Some((job.id, Instant::now() + duration));
        }
        None
    }
}

// ── Factory ────────────────────────────────────────────────────────

/// Creates a fresh [`ConsoleEngine`] for every session.
#[derive(Debug, Clone, Default)]
pub struct ConsoleEngineFactory {
    config: ConsoleEngineConfig,
}

impl ConsoleEngineFactory {
    pub const fn new(config: ConsoleEngineConfig) -> Self {
        Self { config }
    }
}

impl SpeechEngineFactory for ConsoleEngineFactory {
    fn create(&self, events: EngineEventSender) -> Arc<dyn SpeechEngine> {
        Arc::new(ConsoleEngine::spawn(self.config.clone(), events))
    }
}

#[cfg(test)]
mod tests {
    use readaloud_core::paragraphs_to_jobs;
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    fn fast_config() -> ConsoleEngineConfig {
        ConsoleEngineConfig {
            words_per_minute: 60_000,
            supported_locales: vec![Locale::parse("en-US").unwrap()],
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    #[test]
    fn duration_scales_with_words() {
        assert_eq!(utterance_duration("one two three", 60), Duration::from_secs(3));
        assert_eq!(utterance_duration("", 60), Duration::from_secs(1));
        assert_eq!(utterance_duration("word", 0), Duration::from_secs(60));
    }

    #[test]
    fn reports_start_and_done_in_order() {
        let (tx, mut rx) = unbounded_channel();
        let engine = ConsoleEngine::spawn(fast_config(), tx);
        let jobs = paragraphs_to_jobs(&["First one. Second one."]);
        for job in &jobs {
            engine.speak(job);
        }

        let events: Vec<_> = (0..4).map(|_| rx.blocking_recv().unwrap()).collect();
        assert_eq!(
            events,
            vec![
                UtteranceEvent::Started(jobs[0].id.clone()),
                UtteranceEvent::Done(jobs[0].id.clone()),
                UtteranceEvent::Started(jobs[1].id.clone()),
                UtteranceEvent::Done(jobs[1].id.clone()),
            ]
        );

        engine.shutdown();
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn stop_drops_utterance_without_done() {
        let (tx, mut rx) = unbounded_channel();
        let config = ConsoleEngineConfig {
            words_per_minute: 40,
            ..fast_config()
        };
        let engine = ConsoleEngine::spawn(config, tx);
        let jobs = paragraphs_to_jobs(&["A rather slow sentence. Another."]);
        for job in &jobs {
            engine.speak(job);
        }

        assert_eq!(
            rx.blocking_recv(),
            Some(UtteranceEvent::Started(jobs[0].id.clone()))
        );
        engine.stop();
        assert!(!engine.is_speaking());

        engine.shutdown();
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn overlong_utterance_reports_error() {
        let (tx, mut rx) = unbounded_channel();
        let config = ConsoleEngineConfig {
            max_input_chars: 5,
            ..fast_config()
        };
        let engine = ConsoleEngine::spawn(config, tx);
        let job = paragraphs_to_jobs(&["Far too long for this engine."]).remove(0);
        engine.speak(&job);

        assert_eq!(
            rx.blocking_recv(),
            Some(UtteranceEvent::Error {
                id: job.id,
                code: Some(ERROR_INPUT_TOO_LONG),
            })
        );
    }

    #[tokio::test]
    async fn init_reports_configured_locales() {
        let (tx, _rx) = unbounded_channel();
        let engine = ConsoleEngine::spawn(fast_config(), tx);
        let startup = engine.init(&[]).await;
        assert!(startup.ready);
        assert!(
            startup
                .supported_locales
                .contains(&Locale::parse("en-US").unwrap())
        );

        engine.shutdown();
        engine.shutdown();
        assert!(!engine.init(&[]).await.ready);
    }
}
