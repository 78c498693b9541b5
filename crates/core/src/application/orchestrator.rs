//! Generation Orchestrator
//!
//! Fans one job out to the applicable adapters, waits for every one of them
//! (join-all, no sibling cancellation), then folds the results into a single
//! all-or-nothing [`JobOutcome`].

use crate::application::adapters::{
    AdapterResult, CaptionAdapter, HashtagsAdapter, InferenceAdapter, MoodThemeAdapter,
};
use crate::application::progress::{ProgressHandle, ProgressReporter};
use crate::application::retry::RetryPolicy;
use crate::domain::{AdapterKind, GeneratedContent, Job, JobFailure, JobOutcome, MoodTheme};
use crate::port::{CaptionGenerator, HashtagGenerator, MoodClassifier};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

/// Generation Orchestrator: one job in, one outcome out
pub struct GenerationOrchestrator {
    caption: CaptionAdapter,
    hashtags: HashtagsAdapter,
    mood: MoodThemeAdapter,
    progress: ProgressReporter,
}

impl GenerationOrchestrator {
    pub fn new(
        caption: CaptionAdapter,
        hashtags: HashtagsAdapter,
        mood: MoodThemeAdapter,
        progress: ProgressReporter,
    ) -> Self {
        Self {
            caption,
            hashtags,
            mood,
            progress,
        }
    }

    /// Wire the three adapters over their backends with one shared retry policy
    pub fn from_backends(
        caption: Arc<dyn CaptionGenerator>,
        hashtags: Arc<dyn HashtagGenerator>,
        mood: Arc<dyn MoodClassifier>,
        retry: RetryPolicy,
        progress: ProgressReporter,
    ) -> Self {
        Self::new(
            CaptionAdapter::new(caption, retry),
            HashtagsAdapter::new(hashtags, retry),
            MoodThemeAdapter::new(mood, retry),
            progress,
        )
    }

    pub fn progress_reporter(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Run a job with a fresh progress ticker
    pub async fn run(&self, job: &Job) -> JobOutcome {
        let progress = self.progress.start();
        self.run_tracked(job, progress).await
    }

    /// Run a job, forcing `progress` to 100 before returning whatever the outcome
    pub async fn run_tracked(&self, job: &Job, progress: ProgressHandle) -> JobOutcome {
        let span = info_span!("generation", job_id = %job.id, wants_theme = job.wants_theme);

        async move {
            info!(
                image_bytes = job.image.len(),
                mime_type = job.image.mime_type(),
                has_description = job.description.is_some(),
                "Dispatching job to adapters"
            );

            let mood = async {
                if job.wants_theme {
                    Some(self.mood.invoke(job).await)
                } else {
                    None
                }
            };

            let (caption, hashtags, mood) =
                tokio::join!(self.caption.invoke(job), self.hashtags.invoke(job), mood);

            progress.stop();

            let outcome = aggregate(caption, hashtags, mood);
            match &outcome {
                JobOutcome::Completed(content) => info!(
                    hashtags = content.hashtags().len(),
                    theme = ?content.theme(),
                    "Job completed"
                ),
                JobOutcome::Failed { reason } => warn!(
                    adapter = %reason.adapter,
                    kind = %reason.error.kind,
                    error = %reason.error,
                    "Job failed"
                ),
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

/// Fold adapter results into one outcome
///
/// `mood` is `None` when MoodTheme was not launched; when launched it is
/// required. The first failure in the order Caption, Hashtags, MoodTheme
/// wins, and every successful payload is dropped on failure.
pub fn aggregate(
    caption: AdapterResult<String>,
    hashtags: AdapterResult<Vec<String>>,
    mood: Option<AdapterResult<MoodTheme>>,
) -> JobOutcome {
    let failed = |adapter, error| JobOutcome::Failed {
        reason: JobFailure { adapter, error },
    };

    let caption = match caption {
        Ok(c) => c,
        Err(e) => return failed(AdapterKind::Caption, e),
    };
    let hashtags = match hashtags {
        Ok(h) => h,
        Err(e) => return failed(AdapterKind::Hashtags, e),
    };
    let theme = match mood {
        None => None,
        Some(Ok(theme)) => Some(theme),
        Some(Err(e)) => return failed(AdapterKind::MoodTheme, e),
    };

    JobOutcome::Completed(GeneratedContent::new(caption, hashtags, theme))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImagePayload;
    use crate::port::inference::mocks::ScriptedBackend;
    use crate::port::{FailureKind, InferenceError};
    use std::time::Duration;

    fn job(wants_theme: bool) -> Job {
        let image = ImagePayload::from_bytes(b"\xFF\xD8\xFF\xE0fake-jpeg".to_vec()).unwrap();
        Job::new("job-1", 0, image, Some("sunset".to_string()), wants_theme)
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn orchestrator(
        caption: ScriptedBackend<String>,
        hashtags: ScriptedBackend<Vec<String>>,
        mood: ScriptedBackend<String>,
    ) -> GenerationOrchestrator {
        GenerationOrchestrator::from_backends(
            Arc::new(caption),
            Arc::new(hashtags),
            Arc::new(mood),
            RetryPolicy::default(),
            ProgressReporter::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sunset_scenario_completes_with_theme() {
        let orch = orchestrator(
            ScriptedBackend::succeed("Golden hour.".into()),
            ScriptedBackend::succeed(tags(&["sunset", "travel"])),
            ScriptedBackend::succeed("Calm".into()),
        );

        let outcome = orch.run(&job(true)).await;
        let content = outcome.content().expect("completed");
        assert_eq!(content.caption(), "Golden hour.");
        assert_eq!(content.hashtags(), tags(&["sunset", "travel"]).as_slice());
        assert_eq!(content.theme(), Some(MoodTheme::Calm));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_enum_theme_fails_required_job() {
        let orch = orchestrator(
            ScriptedBackend::succeed("Golden hour.".into()),
            ScriptedBackend::succeed(tags(&["sunset", "travel"])),
            ScriptedBackend::succeed("Rainy".into()),
        );

        let outcome = orch.run(&job(true)).await;
        let reason = outcome.failure().expect("failed");
        assert_eq!(reason.adapter, AdapterKind::MoodTheme);
        assert_eq!(reason.error.kind, FailureKind::SchemaViolation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hashtag_failure_discards_caption() {
        let caption = ScriptedBackend::succeed("Golden hour.".to_string());
        let orch = orchestrator(
            caption.clone(),
            ScriptedBackend::fail(InferenceError::rejected("400")),
            ScriptedBackend::succeed("Calm".into()),
        );

        let outcome = orch.run(&job(false)).await;
        assert!(!outcome.is_completed());
        assert_eq!(outcome.failure().unwrap().adapter, AdapterKind::Hashtags);
        // Caption was still computed; it just never surfaces
        assert_eq!(caption.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_not_requested_ignores_mood_backend() {
        let mood = ScriptedBackend::fail(InferenceError::rejected("mood backend down"));
        let orch = orchestrator(
            ScriptedBackend::succeed("Golden hour.".into()),
            ScriptedBackend::succeed(tags(&["sunset"])),
            mood.clone(),
        );

        let outcome = orch.run(&job(false)).await;
        let content = outcome.content().expect("completed");
        assert_eq!(content.theme(), None);
        assert_eq!(mood.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_break_prefers_caption_even_when_it_fails_last() {
        // Hashtags fails immediately, caption fails after a long delay
        let orch = orchestrator(
            ScriptedBackend::fail(InferenceError::rejected("caption refused"))
                .with_latency(Duration::from_secs(5)),
            ScriptedBackend::fail(InferenceError::rejected("hashtags refused")),
            ScriptedBackend::succeed("Joy".into()),
        );

        let outcome = orch.run(&job(true)).await;
        let reason = outcome.failure().unwrap();
        assert_eq!(reason.adapter, AdapterKind::Caption);
        assert_eq!(reason.error.message, "caption refused");
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_all_waits_for_slow_siblings() {
        let slow_mood = ScriptedBackend::succeed("Joy".to_string()).with_latency(Duration::from_secs(3));
        let orch = orchestrator(
            ScriptedBackend::fail(InferenceError::rejected("caption refused")),
            ScriptedBackend::succeed(tags(&["sunset"])),
            slow_mood.clone(),
        );

        let start = tokio::time::Instant::now();
        let outcome = orch.run(&job(true)).await;
        assert!(!outcome.is_completed());
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(slow_mood.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_absorbed_below_budget() {
        let orch = orchestrator(
            ScriptedBackend::transient_then(2, "Golden hour.".into()),
            ScriptedBackend::transient_then(1, tags(&["sunset"])),
            ScriptedBackend::succeed("Neutral".into()),
        );

        let outcome = orch.run(&job(true)).await;
        assert!(outcome.is_completed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_fails_job() {
        let orch = orchestrator(
            ScriptedBackend::succeed("Golden hour.".into()),
            ScriptedBackend::transient_then(3, tags(&["sunset"])),
            ScriptedBackend::succeed("Neutral".into()),
        );

        let outcome = orch.run(&job(false)).await;
        let reason = outcome.failure().unwrap();
        assert_eq!(reason.adapter, AdapterKind::Hashtags);
        assert_eq!(reason.error.kind, FailureKind::RetryExhausted);
        assert_eq!(reason.user_notice(), "Failed to process the image. Please try again.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_forced_to_done_on_failure() {
        let orch = orchestrator(
            ScriptedBackend::fail(InferenceError::rejected("nope")),
            ScriptedBackend::succeed(tags(&["sunset"])),
            ScriptedBackend::succeed("Joy".into()),
        );

        let progress = orch.progress_reporter().start();
        let rx = progress.subscribe();
        let outcome = orch.run_tracked(&job(false), progress).await;
        assert!(!outcome.is_completed());
        assert_eq!(*rx.borrow(), 100);
    }

    #[test]
    fn test_aggregate_without_mood_never_has_theme() {
        let outcome = aggregate(Ok("c".into()), Ok(tags(&["t"])), None);
        assert_eq!(outcome.content().unwrap().theme(), None);
    }
}
