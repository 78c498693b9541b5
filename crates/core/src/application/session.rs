//! Generation Session
//!
//! Caller side of the orchestrator for a single user:
//! - validates uploads and builds jobs (injected IDs and timestamps)
//! - runs each job on its own task, isolating panics
//! - a new submit supersedes the previous job; its late result is discarded
//! - status is available by poll (state, progress, content or error)
//! - themes from completed jobs flow into the [`ThemeApplier`]

use crate::application::orchestrator::GenerationOrchestrator;
use crate::application::theme::ThemeApplier;
use crate::domain::{
    Generation, GeneratedContent, ImagePayload, Job, JobId, JobOutcome, JobState, MoodTheme,
    GENERIC_FAILURE_NOTICE,
};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, TimeProvider};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};
use tracing::{debug, error, info};

/// How many finished or superseded jobs stay queryable
const JOB_HISTORY_LIMIT: usize = 16;

/// Upload submitted by the caller
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub image: Vec<u8>,
    pub description: Option<String>,
    /// `None` follows the session's auto-theme switch
    pub wants_theme: Option<bool>,
}

/// Poll view of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    pub job_id: JobId,
    pub state: JobState,
    /// Epoch milliseconds
    pub submitted_at: i64,
    pub progress: u8,
    pub content: Option<GeneratedContent>,
    /// Generic user-facing notice when the job failed
    pub notice: Option<String>,
    /// Diagnostic detail when the job failed
    pub error: Option<String>,
}

/// Theme switch and rendered variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeView {
    pub auto_theme: bool,
    pub current_theme: Option<MoodTheme>,
    pub variables: BTreeMap<String, String>,
}

struct JobRecord {
    id: JobId,
    generation: Generation,
    submitted_at: i64,
    state: JobState,
    progress: watch::Receiver<u8>,
    content: Option<GeneratedContent>,
    error: Option<String>,
}

impl JobRecord {
    fn status(&self) -> JobStatus {
        let failed = self.state == JobState::Failed;
        JobStatus {
            job_id: self.id.clone(),
            state: self.state,
            submitted_at: self.submitted_at,
            progress: *self.progress.borrow(),
            content: self.content.clone(),
            notice: failed.then(|| GENERIC_FAILURE_NOTICE.to_string()),
            error: self.error.clone(),
        }
    }
}

#[derive(Default)]
struct SessionState {
    last_generation: Generation,
    latest: Option<JobRecord>,
    history: VecDeque<JobRecord>,
}

impl SessionState {
    fn find(&self, job_id: &str) -> Option<&JobRecord> {
        self.latest
            .iter()
            .chain(self.history.iter())
            .find(|record| record.id == job_id)
    }

    fn retire_latest(&mut self) {
        if let Some(mut previous) = self.latest.take() {
            if previous.state == JobState::Running {
                info!(job_id = %previous.id, "Job superseded by a newer submission");
                previous.state = JobState::Superseded;
            }
            self.history.push_front(previous);
            self.history.truncate(JOB_HISTORY_LIMIT);
        }
    }
}

/// Single-caller generation session
pub struct GenerationSession {
    orchestrator: Arc<GenerationOrchestrator>,
    theme: Arc<Mutex<ThemeApplier>>,
    state: Arc<Mutex<SessionState>>,
    finished: Arc<Notify>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl GenerationSession {
    pub fn new(
        orchestrator: Arc<GenerationOrchestrator>,
        theme: ThemeApplier,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            orchestrator,
            theme: Arc::new(Mutex::new(theme)),
            state: Arc::new(Mutex::new(SessionState::default())),
            finished: Arc::new(Notify::new()),
            id_provider,
            time_provider,
        }
    }

    /// Validate the upload and start a job; returns its ID immediately
    ///
    /// # Errors
    /// - `AppError::Domain` if the image is empty, too large, or not PNG/JPEG/GIF
    pub async fn submit(&self, req: SubmitRequest) -> Result<JobId> {
        let image = ImagePayload::from_bytes(req.image)?;
        let wants_theme = match req.wants_theme {
            Some(wants) => wants,
            None => self.theme.lock().await.auto_theme(),
        };

        let mut state = self.state.lock().await;
        state.last_generation += 1;
        let generation = state.last_generation;

        let job = Job::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
            image,
            req.description,
            wants_theme,
        )
        .with_generation(generation);
        let job_id = job.id.clone();

        let progress = self.orchestrator.progress_reporter().start();
        state.retire_latest();
        state.latest = Some(JobRecord {
            id: job_id.clone(),
            generation,
            submitted_at: job.created_at,
            state: JobState::Running,
            progress: progress.subscribe(),
            content: None,
            error: None,
        });
        drop(state);

        info!(
            job_id = %job_id,
            generation = generation,
            wants_theme = wants_theme,
            "Job submitted"
        );

        // Run on its own task so a panicking backend fails the job, not the caller
        let orchestrator = Arc::clone(&self.orchestrator);
        let handle = tokio::spawn(async move { orchestrator.run_tracked(&job, progress).await });

        let state = Arc::clone(&self.state);
        let theme = Arc::clone(&self.theme);
        let finished = Arc::clone(&self.finished);
        let id = job_id.clone();
        tokio::spawn(async move {
            let outcome = match handle.await {
                Ok(outcome) => Ok(outcome),
                Err(join_err) => {
                    if join_err.is_panic() {
                        error!(job_id = %id, "Job panicked: {:?}", join_err);
                    } else {
                        error!(job_id = %id, "Job cancelled: {:?}", join_err);
                    }
                    Err(format!("internal error: {}", join_err))
                }
            };
            Self::finish(&state, &theme, &id, generation, outcome).await;
            finished.notify_waiters();
        });

        Ok(job_id)
    }

    async fn finish(
        state: &Mutex<SessionState>,
        theme: &Mutex<ThemeApplier>,
        job_id: &str,
        generation: Generation,
        outcome: std::result::Result<JobOutcome, String>,
    ) {
        let mut state = state.lock().await;
        let record = match state.latest.as_mut() {
            Some(record) if record.id == job_id && record.generation == generation => record,
            _ => {
                debug!(job_id = %job_id, "Discarding result of superseded job");
                return;
            }
        };

        match outcome {
            Ok(JobOutcome::Completed(content)) => {
                record.state = JobState::Completed;
                if let Some(mood) = content.theme() {
                    theme.lock().await.offer(mood);
                }
                record.content = Some(content);
            }
            Ok(JobOutcome::Failed { reason }) => {
                record.state = JobState::Failed;
                record.error = Some(reason.to_string());
            }
            Err(detail) => {
                record.state = JobState::Failed;
                record.error = Some(detail);
            }
        }
    }

    /// Current status of a job
    ///
    /// # Errors
    /// - `AppError::NotFound` if the job is unknown or fell out of history
    pub async fn status(&self, job_id: &str) -> Result<JobStatus> {
        self.state
            .lock()
            .await
            .find(job_id)
            .map(JobRecord::status)
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))
    }

    /// Wait until a job leaves `Running`
    pub async fn wait_for(&self, job_id: &str) -> Result<JobStatus> {
        loop {
            let finished = self.finished.notified();
            let status = self.status(job_id).await?;
            if status.state.is_terminal() {
                return Ok(status);
            }
            finished.await;
        }
    }

    pub async fn set_auto_theme(&self, enabled: bool) -> ThemeView {
        let mut theme = self.theme.lock().await;
        theme.set_auto_theme(enabled);
        info!(auto_theme = enabled, "Auto-theme switched");
        Self::view(&theme)
    }

    pub async fn theme_view(&self) -> ThemeView {
        Self::view(&*self.theme.lock().await)
    }

    fn view(theme: &ThemeApplier) -> ThemeView {
        ThemeView {
            auto_theme: theme.auto_theme(),
            current_theme: theme.current(),
            variables: theme.variables(),
        }
    }
}
