//! Reader session: ties submitted text, the playback coordinator and the
//! published read position together.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use readaloud_core::{
    ReadPosition, UtteranceJob, paragraphs_to_jobs, paragraphs_to_jobs_from, text_to_paragraphs,
    translate,
};

use crate::coordinator::{PlaybackCoordinator, PlaybackState, SessionState, UtteranceFailure};
use crate::error::SpeechError;

/// What a reader view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderState {
    /// The submitted text split into paragraphs.
    pub paragraphs: Vec<String>,

    /// Where the highlight should be.
    pub read_position: ReadPosition,
}

/// Submits text for reading and tracks the read position.
///
/// Two background tasks translate the coordinator's current job and its
/// error stream into [`ReaderState::read_position`]. They run until the
/// session is dropped. Errors from an engine session older than the current
/// text are ignored.
pub struct ReaderSession {
    coordinator: Arc<PlaybackCoordinator>,
    state_tx: Arc<watch::Sender<ReaderState>>,
    tasks: Vec<JoinHandle<()>>,
}

impl ReaderSession {
    /// Wrap a coordinator and the error receiver returned alongside it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        coordinator: Arc<PlaybackCoordinator>,
        errors: mpsc::UnboundedReceiver<UtteranceFailure>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ReaderState::default());
        let state_tx = Arc::new(state_tx);

        let tasks = vec![
            spawn_position_tracker(coordinator.subscribe(), Arc::clone(&state_tx)),
            spawn_error_tracker(errors, Arc::clone(&coordinator), Arc::clone(&state_tx)),
        ];

        Self {
            coordinator,
            state_tx,
            tasks,
        }
    }

    /// Start a fresh engine session and queue `text` for reading.
    ///
    /// Returns the number of queued jobs. When the engine cannot be started
    /// the previous text stays on display and nothing is queued.
    pub async fn submit_text(&self, text: &str) -> Result<usize, SpeechError> {
        self.coordinator.init().await?;

        let paragraphs = text_to_paragraphs(text);
        let jobs = paragraphs_to_jobs(&paragraphs);
        let count = jobs.len();
        tracing::info!(paragraphs = paragraphs.len(), jobs = count, "Text submitted");

        self.state_tx.send_modify(|state| {
            state.paragraphs = paragraphs;
            state.read_position = ReadPosition::NotStarted;
        });
        self.coordinator.spool(jobs);
        Ok(count)
    }

    /// Drop whatever is queued and read from paragraph `index` to the end.
    pub fn play_from_paragraph(&self, index: usize) -> Result<usize, SpeechError> {
        if self.coordinator.state() != SessionState::Ready {
            return Err(SpeechError::NotReady);
        }

        let jobs = {
            let state = self.state_tx.borrow();
            let count = state.paragraphs.len();
            if index >= count {
                return Err(SpeechError::ParagraphOutOfRange { index, count });
            }
            paragraphs_to_jobs_from(&state.paragraphs[index..], index)
        };

        let count = jobs.len();
        tracing::debug!(index, jobs = count, "Playing from paragraph");
        self.coordinator.skip_to(jobs);
        Ok(count)
    }

    pub fn pause(&self) {
        self.coordinator.pause();
    }

    pub fn resume(&self) {
        self.coordinator.resume();
    }

    pub fn stop(&self) {
        self.coordinator.stop();
    }

    pub fn subscribe(&self) -> watch::Receiver<ReaderState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> ReaderState {
        self.state_tx.borrow().clone()
    }

    pub const fn coordinator(&self) -> &Arc<PlaybackCoordinator> {
        &self.coordinator
    }
}

impl Drop for ReaderSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn publish_position(state_tx: &watch::Sender<ReaderState>, job: &UtteranceJob, is_error: bool) {
    match translate(job, is_error) {
        Ok(position) => state_tx.send_modify(|state| state.read_position = position),
        Err(e) => tracing::warn!(error = %e, "Skipping read position update"),
    }
}

fn spawn_position_tracker(
    mut playback: watch::Receiver<PlaybackState>,
    state_tx: Arc<watch::Sender<ReaderState>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let current = playback.borrow_and_update().current_job.clone();
            if let Some(job) = current {
                publish_position(&state_tx, &job, false);
            }
            if playback.changed().await.is_err() {
                break;
            }
        }
    })
}

fn spawn_error_tracker(
    mut errors: mpsc::UnboundedReceiver<UtteranceFailure>,
    coordinator: Arc<PlaybackCoordinator>,
    state_tx: Arc<watch::Sender<ReaderState>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = errors.recv().await {
            let current = coordinator.generation();
            if failure.generation != current {
                tracing::debug!(
                    id = %failure.job.id,
                    failure_generation = failure.generation,
                    current_generation = current,
                    "Ignoring error from superseded speech session"
                );
                continue;
            }
            publish_position(&state_tx, &failure.job, true);
        }
    })
}
