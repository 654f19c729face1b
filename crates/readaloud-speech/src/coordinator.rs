//! Playback coordinator: drives one speech engine session through a queue
//! of utterance jobs and republishes what the engine reports.
//!
//! ```text
//!   Uninitialized ──init()──▶ Initializing ──engine ready + locale──▶ Ready
//!                                  │  ▲                                 │
//!                 start failure /  │  └────────── init() ───────────────┘
//!                 no locale        ▼
//!                                Failed ──init()──▶ Initializing
//! ```
//!
//! # Locking discipline
//!
//! One `std::sync::Mutex` guards the pending queue, the current job, the
//! session state and the engine handle. It is never held across an
//! `.await`. Engine events arrive on a per-session channel and are applied by
//! a pump task under the same lock, so the drain-until-match scan is atomic
//! with respect to concurrent `spool` / `stop` / `skip_to` calls.
//!
//! # Sessions
//!
//! Every `init()` bumps a generation counter. Events from an older
//! generation, and events whose id is not pending, are orphan callbacks:
//! logged and ignored.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;

use readaloud_core::{
    Locale, ReaderSettings, SpeechEngine, SpeechEngineFactory, UtteranceEvent, UtteranceId,
    UtteranceJob, default_locale_candidates,
};

use crate::error::SpeechError;
use crate::locale::negotiate_locale;

// ── Session state machine ──────────────────────────────────────────

/// Lifecycle of the coordinator's engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No engine session exists.
    Uninitialized,

    /// An engine was created and its start-up has not resolved yet.
    Initializing,

    /// The engine is running with a negotiated locale.
    Ready,

    /// The last start-up failed; the engine was shut down.
    Failed,
}

// ── Published state ────────────────────────────────────────────────

/// State published to observers after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// The job the engine most recently reported as started, until it is
    /// confirmed done or failed.
    pub current_job: Option<UtteranceJob>,

    /// Whether the current session finished start-up successfully.
    pub ready: bool,
}

/// A job the engine failed to speak, tagged with the session that spoke it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceFailure {
    /// Generation of the engine session that reported the error.
    pub generation: u64,

    pub job: UtteranceJob,
}

// ── Configuration ──────────────────────────────────────────────────

/// Configuration for the playback coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Locales to negotiate, highest priority first.
    pub locale_candidates: Vec<Locale>,

    /// Locales present on the platform. `None` accepts anything the engine
    /// supports.
    pub platform_locales: Option<BTreeSet<Locale>>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            locale_candidates: default_locale_candidates(),
            platform_locales: None,
        }
    }
}

impl CoordinatorConfig {
    #[must_use]
    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            locale_candidates: settings.effective_locale_candidates(),
            platform_locales: settings
                .platform_locales
                .as_ref()
                .map(|locales| locales.iter().cloned().collect()),
        }
    }
}

// ── Shared session data ────────────────────────────────────────────

/// Everything the caller side and the engine-event side both touch.
struct Session {
    generation: u64,
    state: SessionState,
    engine: Option<Arc<dyn SpeechEngine>>,
    pump: Option<JoinHandle<()>>,
    /// Fired on teardown so an `init` still waiting on this session gives up.
    cancel: Option<Arc<Notify>>,
    pending: VecDeque<UtteranceJob>,
    current_job: Option<UtteranceJob>,
}

impl Session {
    const fn new() -> Self {
        Self {
            generation: 0,
            state: SessionState::Uninitialized,
            engine: None,
            pump: None,
            cancel: None,
            pending: VecDeque::new(),
            current_job: None,
        }
    }

    /// The engine, only once start-up has completed.
    fn ready_engine(&self) -> Option<&Arc<dyn SpeechEngine>> {
        match self.state {
            SessionState::Ready => self.engine.as_ref(),
            _ => None,
        }
    }

    /// Stop speech, release the engine and forget all outstanding work.
    fn teardown(&mut self) {
        if let Some(engine) = self.engine.take() {
            if engine.is_speaking() {
                engine.stop();
            }
            engine.shutdown();
            tracing::debug!(generation = self.generation, "Speech engine shut down");
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if let Some(cancel) = self.cancel.take() {
            // Stores a permit when no `init` is waiting yet.
            cancel.notify_one();
        }
        self.pending.clear();
        self.current_job = None;
    }

    /// Append jobs and hand them to the engine in order.
    fn enqueue(&mut self, jobs: Vec<UtteranceJob>) {
        let first_new = self.pending.len();
        self.pending.extend(jobs);

        match self.ready_engine() {
            Some(engine) => {
                for job in self.pending.range(first_new..) {
                    engine.speak(job);
                }
            }
            None => tracing::warn!(
                state = ?self.state,
                queued = self.pending.len() - first_new,
                "Jobs queued without a ready speech engine"
            ),
        }
    }

    fn on_started(&mut self, id: &UtteranceId) {
        match self.pending.iter().find(|job| &job.id == id) {
            Some(job) => self.current_job = Some(job.clone()),
            None => tracing::debug!(%id, "Ignoring start of an utterance that is not pending"),
        }
    }

    fn on_done(&mut self, id: &UtteranceId) {
        if self.drain_until(id).is_none() {
            self.forget_orphan(id);
        }
    }

    fn on_error(&mut self, id: &UtteranceId) -> Option<UtteranceJob> {
        let job = self.drain_until(id);
        if job.is_none() {
            self.forget_orphan(id);
        }
        job
    }

    /// Pop jobs from the front up to and including the one with `id`.
    ///
    /// Returns `None` and leaves the queue untouched when `id` is not
    /// pending. Jobs ahead of the match are discarded without being reported.
    fn drain_until(&mut self, id: &UtteranceId) -> Option<UtteranceJob> {
        let index = self.pending.iter().position(|job| &job.id == id)?;
        if index > 0 {
            tracing::debug!(%id, skipped = index, "Discarding jobs queued ahead of finished utterance");
        }
        let matched = self.pending.drain(..=index).last();

        let current_still_pending = self
            .current_job
            .as_ref()
            .is_some_and(|current| self.pending.iter().any(|job| job.id == current.id));
        if !current_still_pending {
            self.current_job = None;
        }
        matched
    }

    /// A callback for an id that is not pending only clears the current job
    /// if nothing has replaced it since.
    fn forget_orphan(&mut self, id: &UtteranceId) {
        tracing::debug!(%id, "Orphan utterance callback");
        if self.current_job.as_ref().is_some_and(|current| &current.id == id) {
            self.current_job = None;
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    state_tx: watch::Sender<PlaybackState>,
    error_tx: mpsc::UnboundedSender<UtteranceFailure>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_current_job(&self, session: &Session) {
        self.state_tx.send_if_modified(|state| {
            if state.current_job == session.current_job {
                return false;
            }
            state.current_job.clone_from(&session.current_job);
            true
        });
    }

    /// Apply an engine event if it belongs to `generation`.
    fn apply(&self, generation: u64, event: UtteranceEvent) {
        let mut session = self.lock();
        if session.generation != generation {
            tracing::debug!(
                id = %event.id(),
                event_generation = generation,
                current_generation = session.generation,
                "Ignoring event from superseded speech session"
            );
            return;
        }
        self.apply_locked(&mut session, event);
    }

    fn apply_locked(&self, session: &mut Session, event: UtteranceEvent) {
        match event {
            UtteranceEvent::Started(id) => {
                tracing::trace!(%id, "Utterance started");
                session.on_started(&id);
            }
            UtteranceEvent::Done(id) => {
                tracing::trace!(%id, "Utterance done");
                session.on_done(&id);
            }
            UtteranceEvent::Error { id, code } => {
                tracing::warn!(%id, ?code, "Speech engine reported an utterance error");
                if let Some(job) = session.on_error(&id) {
                    // Receiver gone means nobody is rendering errors.
                    let _ = self.error_tx.send(UtteranceFailure {
                        generation: session.generation,
                        job,
                    });
                }
            }
        }
        self.publish_current_job(session);
    }
}

/// Forward engine events into the shared session until the engine drops its
/// sender or the pump is aborted by a teardown.
fn spawn_event_pump(
    shared: Arc<Shared>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<UtteranceEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            shared.apply(generation, event);
        }
        tracing::debug!(generation, "Speech engine event channel closed");
    })
}

// ── Coordinator ────────────────────────────────────────────────────

/// Owns the pending-job queue and the lifecycle of one speech engine session.
///
/// Published state is available through [`subscribe`](Self::subscribe); jobs
/// the engine failed to speak are delivered on the error receiver returned by
/// [`new`](Self::new).
pub struct PlaybackCoordinator {
    factory: Arc<dyn SpeechEngineFactory>,
    config: CoordinatorConfig,
    shared: Arc<Shared>,
}

impl PlaybackCoordinator {
    /// Create a coordinator with no engine session.
    ///
    /// Returns the coordinator and the receiving end of the error stream.
    #[must_use]
    pub fn new(
        factory: Arc<dyn SpeechEngineFactory>,
        config: CoordinatorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<UtteranceFailure>) {
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(PlaybackState::default());

        let coordinator = Self {
            factory,
            config,
            shared: Arc::new(Shared {
                session: Mutex::new(Session::new()),
                state_tx,
                error_tx,
            }),
        };

        (coordinator, error_rx)
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Start a fresh engine session and wait until it is ready.
    ///
    /// Any previous session is stopped and shut down, and the pending queue
    /// and published state are cleared, before the new engine is created.
    /// Calling `init` or [`shutdown`](Self::shutdown) while another `init`
    /// is still waiting tears that attempt down; the earlier call returns
    /// [`SpeechError::Superseded`] right away, whether or not its engine ever
    /// finishes start-up.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn init(&self) -> Result<Locale, SpeechError> {
        let generation = {
            let mut session = self.shared.lock();
            session.teardown();
            session.generation += 1;
            session.state = SessionState::Initializing;
            self.shared.state_tx.send_replace(PlaybackState::default());
            session.generation
        };
        tracing::info!(generation, "Starting speech session");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let engine = self.factory.create(events_tx);
        let cancel = Arc::new(Notify::new());
        {
            let mut session = self.shared.lock();
            if session.generation != generation {
                engine.shutdown();
                return Err(SpeechError::Superseded);
            }
            session.engine = Some(Arc::clone(&engine));
            session.cancel = Some(Arc::clone(&cancel));
            session.pump = Some(spawn_event_pump(
                Arc::clone(&self.shared),
                generation,
                events_rx,
            ));
        }

        let startup = tokio::select! {
            startup = engine.init(&self.config.locale_candidates) => startup,
            () = cancel.notified() => {
                tracing::debug!(generation, "Speech engine start-up abandoned");
                return Err(SpeechError::Superseded);
            }
        };

        let mut session = self.shared.lock();
        if session.generation != generation {
            // The newer init already shut this engine down.
            return Err(SpeechError::Superseded);
        }

        if !startup.ready {
            self.fail(&mut session);
            tracing::warn!(generation, "Speech engine failed to start");
            return Err(SpeechError::EngineStartFailed);
        }

        let Some(locale) = negotiate_locale(
            &startup.supported_locales,
            self.config.platform_locales.as_ref(),
            &self.config.locale_candidates,
        ) else {
            self.fail(&mut session);
            let candidates = self
                .config
                .locale_candidates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(generation, %candidates, "No supported locale for speech engine");
            return Err(SpeechError::NoSupportedLocale(candidates));
        };

        engine.set_locale(&locale);
        session.state = SessionState::Ready;
        self.shared.state_tx.send_modify(|state| state.ready = true);
        tracing::info!(generation, %locale, "Speech session ready");
        Ok(locale)
    }

    fn fail(&self, session: &mut Session) {
        session.teardown();
        session.state = SessionState::Failed;
        self.shared.state_tx.send_replace(PlaybackState::default());
    }

    /// Tear the session down and return to [`SessionState::Uninitialized`].
    pub fn shutdown(&self) {
        let mut session = self.shared.lock();
        session.teardown();
        session.state = SessionState::Uninitialized;
        self.shared.state_tx.send_replace(PlaybackState::default());
        tracing::info!("Speech session closed");
    }

    // ── Playback ───────────────────────────────────────────────────

    /// Append jobs to the pending queue and submit them to the engine in
    /// order, without waiting for any of them to be spoken.
    pub fn spool(&self, jobs: Vec<UtteranceJob>) {
        tracing::debug!(count = jobs.len(), "Spooling jobs");
        self.shared.lock().enqueue(jobs);
    }

    /// Stop audio if the engine is speaking. The pending queue is kept so
    /// [`resume`](Self::resume) can replay it.
    pub fn pause(&self) {
        let session = self.shared.lock();
        if let Some(engine) = session.ready_engine() {
            if engine.is_speaking() {
                engine.stop();
                tracing::debug!(pending = session.pending.len(), "Playback paused");
            }
        }
    }

    /// Re-submit every pending job, in order.
    pub fn resume(&self) {
        let session = self.shared.lock();
        if let Some(engine) = session.ready_engine() {
            for job in &session.pending {
                engine.speak(job);
            }
            tracing::debug!(pending = session.pending.len(), "Playback resumed");
        }
    }

    /// Stop audio output. The pending queue is left alone.
    pub fn stop(&self) {
        let session = self.shared.lock();
        if let Some(engine) = &session.engine {
            engine.stop();
        }
    }

    /// Stop audio, drop every pending job and start over with `jobs`.
    pub fn skip_to(&self, jobs: Vec<UtteranceJob>) {
        let mut session = self.shared.lock();
        if let Some(engine) = &session.engine {
            engine.stop();
        }
        let dropped = session.pending.len();
        session.pending.clear();
        session.current_job = None;
        self.shared.publish_current_job(&session);
        tracing::debug!(dropped, count = jobs.len(), "Skipping to new jobs");
        session.enqueue(jobs);
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.shared.lock().state
    }

    /// Generation of the current engine session. Bumped by every `init`.
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Subscribe to published [`PlaybackState`] changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.shared.state_tx.subscribe()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.shared.state_tx.borrow().clone()
    }

    /// Snapshot of the jobs still awaiting completion, in submission order.
    pub fn pending_jobs(&self) -> Vec<UtteranceJob> {
        self.shared.lock().pending.iter().cloned().collect()
    }

    pub fn current_job(&self) -> Option<UtteranceJob> {
        self.shared.lock().current_job.clone()
    }

    /// Nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.shared.lock().pending.is_empty()
    }

    pub const fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}

impl Drop for PlaybackCoordinator {
    fn drop(&mut self) {
        self.shared.lock().teardown();
    }
}
