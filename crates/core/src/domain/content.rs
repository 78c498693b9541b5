// Generated Content & Job Outcome

use crate::domain::error::DomainError;
use crate::port::InferenceError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mood-derived theme, exactly one of five names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodTheme {
    Serenity,
    Sad,
    Joy,
    Calm,
    Neutral,
}

impl MoodTheme {
    pub const ALL: [MoodTheme; 5] = [
        MoodTheme::Serenity,
        MoodTheme::Sad,
        MoodTheme::Joy,
        MoodTheme::Calm,
        MoodTheme::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodTheme::Serenity => "Serenity",
            MoodTheme::Sad => "Sad",
            MoodTheme::Joy => "Joy",
            MoodTheme::Calm => "Calm",
            MoodTheme::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for MoodTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse: names are case-sensitive and never coerced
impl FromStr for MoodTheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodTheme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| DomainError::UnknownTheme(s.to_string()))
    }
}

/// Inference adapters, in failure-reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Caption,
    Hashtags,
    MoodTheme,
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterKind::Caption => write!(f, "caption"),
            AdapterKind::Hashtags => write!(f, "hashtags"),
            AdapterKind::MoodTheme => write!(f, "mood_theme"),
        }
    }
}

/// Content of a completed job
///
/// Only the orchestrator builds this, after every required adapter succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedContent {
    caption: String,
    hashtags: Vec<String>,
    theme: Option<MoodTheme>,
}

impl GeneratedContent {
    pub(crate) fn new(caption: String, hashtags: Vec<String>, theme: Option<MoodTheme>) -> Self {
        Self {
            caption,
            hashtags,
            theme,
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    pub fn theme(&self) -> Option<MoodTheme> {
        self.theme
    }
}

/// The one generic notice shown to users, whatever went wrong
pub const GENERIC_FAILURE_NOTICE: &str = "Failed to process the image. Please try again.";

/// Why a job failed: the first required adapter failure in reporting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub adapter: AdapterKind,
    pub error: InferenceError,
}

impl JobFailure {
    pub fn user_notice(&self) -> &'static str {
        GENERIC_FAILURE_NOTICE
    }
}

impl std::fmt::Display for JobFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} adapter failed: {}", self.adapter, self.error)
    }
}

/// Aggregate result of one orchestration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(GeneratedContent),
    Failed { reason: JobFailure },
}

impl JobOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed(_))
    }

    pub fn content(&self) -> Option<&GeneratedContent> {
        match self {
            JobOutcome::Completed(content) => Some(content),
            JobOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            JobOutcome::Completed(_) => None,
            JobOutcome::Failed { reason } => Some(reason),
        }
    }
}
