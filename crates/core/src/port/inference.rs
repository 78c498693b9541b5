// Inference Ports
// Abstraction over the three externally hosted prompt calls (caption, hashtags, mood)

use crate::domain::ImagePayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured failure classification attached by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Remote signaled temporary unavailability (e.g. HTTP 503)
    Transient,
    /// Transient failures outlasted the attempt budget
    RetryExhausted,
    /// Response did not match the declared output contract
    SchemaViolation,
    /// Remote declined the request for a non-transient reason
    Rejected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "TRANSIENT"),
            FailureKind::RetryExhausted => write!(f, "RETRY_EXHAUSTED"),
            FailureKind::SchemaViolation => write!(f, "SCHEMA_VIOLATION"),
            FailureKind::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Inference call failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct InferenceError {
    pub kind: FailureKind,
    pub message: String,
}

impl InferenceError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transient, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Rejected, message)
    }

    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::SchemaViolation, message)
    }

    pub fn retry_exhausted(attempts: u32, last: &InferenceError) -> Self {
        Self::new(
            FailureKind::RetryExhausted,
            format!("gave up after {} attempts: {}", attempts, last.message),
        )
    }

    pub fn is_transient(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

/// Caption request view: image plus optional description
#[derive(Debug, Clone, Copy)]
pub struct CaptionRequest<'a> {
    pub image: &'a ImagePayload,
    pub description: Option<&'a str>,
}

/// Hashtag request view: image plus optional description
#[derive(Debug, Clone, Copy)]
pub struct HashtagRequest<'a> {
    pub image: &'a ImagePayload,
    pub description: Option<&'a str>,
}

/// Mood request view: image only
#[derive(Debug, Clone, Copy)]
pub struct MoodRequest<'a> {
    pub image: &'a ImagePayload,
}

/// Caption generation backend
///
/// Returns the raw caption text; shape validation happens in the adapter.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    async fn generate_caption(&self, request: CaptionRequest<'_>) -> Result<String, InferenceError>;
}

/// Hashtag generation backend
///
/// Returns raw tags in the order the backend produced them.
#[async_trait]
pub trait HashtagGenerator: Send + Sync {
    async fn generate_hashtags(
        &self,
        request: HashtagRequest<'_>,
    ) -> Result<Vec<String>, InferenceError>;
}

/// Mood classification backend
///
/// Returns the raw theme label; anything outside the five names is rejected
/// by the adapter, not here.
#[async_trait]
pub trait MoodClassifier: Send + Sync {
    async fn classify_mood(&self, request: MoodRequest<'_>) -> Result<String, InferenceError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted backend: replays queued responses, then repeats the fallback
    ///
    /// One type serves all three ports so tests can script caption, hashtag and
    /// mood calls the same way.
    #[derive(Clone)]
    pub struct ScriptedBackend<T: Clone + Send> {
        script: Arc<Mutex<VecDeque<Result<T, InferenceError>>>>,
        fallback: Result<T, InferenceError>,
        latency: Duration,
        call_count: Arc<Mutex<usize>>,
    }

    impl<T: Clone + Send> ScriptedBackend<T> {
        pub fn always(result: Result<T, InferenceError>) -> Self {
            Self {
                script: Arc::new(Mutex::new(VecDeque::new())),
                fallback: result,
                latency: Duration::ZERO,
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn succeed(value: T) -> Self {
            Self::always(Ok(value))
        }

        pub fn fail(error: InferenceError) -> Self {
            Self::always(Err(error))
        }

        /// Fail transiently `times` times, then return `value`
        pub fn transient_then(times: usize, value: T) -> Self {
            let backend = Self::succeed(value);
            {
                let mut script = backend.script.lock().unwrap();
                for i in 0..times {
                    script.push_back(Err(InferenceError::transient(format!(
                        "503 Service Unavailable (#{})",
                        i + 1
                    ))));
                }
            }
            backend
        }

        /// Delay every response (simulated network latency)
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }

        async fn respond(&self) -> Result<T, InferenceError> {
            *self.call_count.lock().unwrap() += 1;
            let next = self.script.lock().unwrap().pop_front();
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            next.unwrap_or_else(|| self.fallback.clone())
        }
    }

    #[async_trait]
    impl CaptionGenerator for ScriptedBackend<String> {
        async fn generate_caption(
            &self,
            _request: CaptionRequest<'_>,
        ) -> Result<String, InferenceError> {
            self.respond().await
        }
    }

    #[async_trait]
    impl HashtagGenerator for ScriptedBackend<Vec<String>> {
        async fn generate_hashtags(
            &self,
            _request: HashtagRequest<'_>,
        ) -> Result<Vec<String>, InferenceError> {
            self.respond().await
        }
    }

    #[async_trait]
    impl MoodClassifier for ScriptedBackend<String> {
        async fn classify_mood(&self, _request: MoodRequest<'_>) -> Result<String, InferenceError> {
            self.respond().await
        }
    }

    /// Backend that panics on every call (for panic isolation testing)
    pub struct PanickingBackend(pub &'static str);

    #[async_trait]
    impl CaptionGenerator for PanickingBackend {
        async fn generate_caption(
            &self,
            _request: CaptionRequest<'_>,
        ) -> Result<String, InferenceError> {
            panic!("{}", self.0);
        }
    }
}
