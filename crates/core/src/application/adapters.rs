//! Inference Call Adapters
//!
//! Each adapter turns one backend port into the uniform
//! `invoke(job) -> AdapterResult` contract:
//! - derives its read-only request view from the job
//! - calls the backend through the transient-retry wrapper
//! - validates the raw output against the declared shape
//!
//! Validation failures are `SchemaViolation` and are never retried: a
//! malformed response is not going to fix itself.

use crate::application::retry::RetryPolicy;
use crate::domain::{AdapterKind, Job, MoodTheme};
use crate::port::{
    CaptionGenerator, CaptionRequest, HashtagGenerator, HashtagRequest, InferenceError,
    MoodClassifier, MoodRequest,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Success payload or terminal failure of one adapter
pub type AdapterResult<T> = Result<T, InferenceError>;

/// Uniform adapter contract
#[async_trait]
pub trait InferenceAdapter: Send + Sync {
    type Output: Send;

    fn kind(&self) -> AdapterKind;

    /// Run the backend call (with retries) and validate its output
    async fn invoke(&self, job: &Job) -> AdapterResult<Self::Output>;
}

/// Caption: non-empty text
pub struct CaptionAdapter {
    generator: Arc<dyn CaptionGenerator>,
    retry: RetryPolicy,
}

impl CaptionAdapter {
    pub fn new(generator: Arc<dyn CaptionGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }
}

#[async_trait]
impl InferenceAdapter for CaptionAdapter {
    type Output = String;

    fn kind(&self) -> AdapterKind {
        AdapterKind::Caption
    }

    async fn invoke(&self, job: &Job) -> AdapterResult<String> {
        let request = CaptionRequest {
            image: &job.image,
            description: job.description(),
        };
        let raw = self
            .retry
            .attempt("caption", || self.generator.generate_caption(request))
            .await?;
        let caption = validate_caption(raw)?;
        debug!(job_id = %job.id, chars = caption.len(), "Caption generated");
        Ok(caption)
    }
}

/// Hashtags: ordered plain tokens
pub struct HashtagsAdapter {
    generator: Arc<dyn HashtagGenerator>,
    retry: RetryPolicy,
}

impl HashtagsAdapter {
    pub fn new(generator: Arc<dyn HashtagGenerator>, retry: RetryPolicy) -> Self {
        Self { generator, retry }
    }
}

#[async_trait]
impl InferenceAdapter for HashtagsAdapter {
    type Output = Vec<String>;

    fn kind(&self) -> AdapterKind {
        AdapterKind::Hashtags
    }

    async fn invoke(&self, job: &Job) -> AdapterResult<Vec<String>> {
        let request = HashtagRequest {
            image: &job.image,
            description: job.description(),
        };
        let raw = self
            .retry
            .attempt("hashtags", || self.generator.generate_hashtags(request))
            .await?;
        let hashtags = validate_hashtags(raw)?;
        debug!(job_id = %job.id, count = hashtags.len(), "Hashtags generated");
        Ok(hashtags)
    }
}

/// MoodTheme: exactly one of the five names
pub struct MoodThemeAdapter {
    classifier: Arc<dyn MoodClassifier>,
    retry: RetryPolicy,
}

impl MoodThemeAdapter {
    pub fn new(classifier: Arc<dyn MoodClassifier>, retry: RetryPolicy) -> Self {
        Self { classifier, retry }
    }
}

#[async_trait]
impl InferenceAdapter for MoodThemeAdapter {
    type Output = MoodTheme;

    fn kind(&self) -> AdapterKind {
        AdapterKind::MoodTheme
    }

    async fn invoke(&self, job: &Job) -> AdapterResult<MoodTheme> {
        let request = MoodRequest { image: &job.image };
        let raw = self
            .retry
            .attempt("mood_theme", || self.classifier.classify_mood(request))
            .await?;
        let theme = validate_theme(&raw)?;
        debug!(job_id = %job.id, theme = %theme, "Mood theme classified");
        Ok(theme)
    }
}

/// Trim surrounding whitespace; reject empty text
pub fn validate_caption(raw: String) -> AdapterResult<String> {
    let caption = raw.trim();
    if caption.is_empty() {
        return Err(InferenceError::schema_violation("caption is empty"));
    }
    Ok(caption.to_string())
}

/// Trim each tag; reject empty lists, empty tags, a leading `#` and embedded whitespace
pub fn validate_hashtags(raw: Vec<String>) -> AdapterResult<Vec<String>> {
    if raw.is_empty() {
        return Err(InferenceError::schema_violation("hashtag list is empty"));
    }

    raw.into_iter()
        .enumerate()
        .map(|(i, tag)| {
            let tag = tag.trim();
            if tag.is_empty() {
                Err(InferenceError::schema_violation(format!(
                    "hashtag #{} is empty",
                    i
                )))
            } else if tag.starts_with('#') {
                Err(InferenceError::schema_violation(format!(
                    "hashtag '{}' has a leading '#'",
                    tag
                )))
            } else if tag.chars().any(char::is_whitespace) {
                Err(InferenceError::schema_violation(format!(
                    "hashtag '{}' contains whitespace",
                    tag
                )))
            } else {
                Ok(tag.to_string())
            }
        })
        .collect()
}

/// Exact match against the five theme names
pub fn validate_theme(raw: &str) -> AdapterResult<MoodTheme> {
    raw.parse::<MoodTheme>().map_err(|_| {
        InferenceError::schema_violation(format!(
            "theme '{}' is not one of Serenity, Sad, Joy, Calm, Neutral",
            raw
        ))
    })
}
