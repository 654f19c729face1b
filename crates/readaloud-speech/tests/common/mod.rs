//! Shared fixtures for the speech integration tests.
//!
//! [`ScriptedEngine`] records every command it receives and only reports
//! progress when a test tells it to, so callback ordering is fully under the
//! test's control.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use readaloud_core::{
    EngineEventSender, EngineStartup, Locale, SpeechEngine, SpeechEngineFactory, UtteranceEvent,
    UtteranceId, UtteranceJob,
};
use readaloud_speech::CoordinatorConfig;
use tokio::sync::Notify;

// ── Engine ─────────────────────────────────────────────────────────

/// A command the coordinator sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init,
    SetLocale(Locale),
    Speak(UtteranceId),
    Stop,
    Shutdown,
}

pub struct ScriptedEngine {
    events: EngineEventSender,
    startup: EngineStartup,
    gate: Option<Arc<Notify>>,
    speaking: AtomicBool,
    commands: Mutex<Vec<Command>>,
}

impl ScriptedEngine {
    fn record(&self, command: Command) {
        self.commands.lock().unwrap().push(command);
    }

    pub fn emit(&self, event: UtteranceEvent) {
        let _ = self.events.send(event);
    }

    pub fn started(&self, job: &UtteranceJob) {
        self.emit(UtteranceEvent::Started(job.id.clone()));
    }

    pub fn done(&self, job: &UtteranceJob) {
        self.emit(UtteranceEvent::Done(job.id.clone()));
    }

    pub fn error(&self, job: &UtteranceJob) {
        self.emit(UtteranceEvent::Error {
            id: job.id.clone(),
            code: None,
        });
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    /// Ids passed to `speak`, in order.
    pub fn spoken(&self) -> Vec<UtteranceId> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                Command::Speak(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::SeqCst);
    }
}

#[async_trait]
impl SpeechEngine for ScriptedEngine {
    async fn init(&self, _candidates: &[Locale]) -> EngineStartup {
        self.record(Command::Init);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.startup.clone()
    }

    fn set_locale(&self, locale: &Locale) {
        self.record(Command::SetLocale(locale.clone()));
    }

    fn speak(&self, job: &UtteranceJob) {
        self.record(Command::Speak(job.id.clone()));
        self.set_speaking(true);
    }

    fn stop(&self) {
        self.record(Command::Stop);
        self.set_speaking(false);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn shutdown(&self) {
        self.record(Command::Shutdown);
        self.set_speaking(false);
    }
}

// ── Factory ────────────────────────────────────────────────────────

/// Hands out [`ScriptedEngine`]s and keeps every one it created.
pub struct ScriptedFactory {
    startup: EngineStartup,
    next_gate: Mutex<Option<Arc<Notify>>>,
    created: Mutex<Vec<Arc<ScriptedEngine>>>,
}

impl ScriptedFactory {
    pub fn ready(tags: &[&str]) -> Arc<Self> {
        Self::with_startup(EngineStartup::ready(locales(tags)))
    }

    pub fn failing() -> Arc<Self> {
        Self::with_startup(EngineStartup::failed())
    }

    fn with_startup(startup: EngineStartup) -> Arc<Self> {
        Arc::new(Self {
            startup,
            next_gate: Mutex::new(None),
            created: Mutex::new(Vec::new()),
        })
    }

    /// Make the next engine's `init` wait until the returned gate is
    /// notified.
    pub fn gate_next(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.next_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn engine(&self, index: usize) -> Arc<ScriptedEngine> {
        Arc::clone(&self.created.lock().unwrap()[index])
    }

    pub fn latest(&self) -> Arc<ScriptedEngine> {
        Arc::clone(self.created.lock().unwrap().last().expect("no engine created"))
    }

    pub fn created(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl SpeechEngineFactory for ScriptedFactory {
    fn create(&self, events: EngineEventSender) -> Arc<dyn SpeechEngine> {
        let engine = Arc::new(ScriptedEngine {
            events,
            startup: self.startup.clone(),
            gate: self.next_gate.lock().unwrap().take(),
            speaking: AtomicBool::new(false),
            commands: Mutex::new(Vec::new()),
        });
        self.created.lock().unwrap().push(Arc::clone(&engine));
        engine
    }
}

// ── Helpers ────────────────────────────────────────────────────────

pub fn locale(tag: &str) -> Locale {
    Locale::parse(tag).unwrap()
}

pub fn locales(tags: &[&str]) -> Vec<Locale> {
    tags.iter().map(|tag| locale(tag)).collect()
}

pub fn config(candidates: &[&str]) -> CoordinatorConfig {
    CoordinatorConfig {
        locale_candidates: locales(candidates),
        platform_locales: None,
    }
}

pub fn ids(jobs: &[UtteranceJob]) -> Vec<UtteranceId> {
    jobs.iter().map(|job| job.id.clone()).collect()
}

/// Let spawned tasks (event pumps, trackers) run until they go quiet.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
