//! RPC Request/Response Types
//!
//! Method parameters and results for the `content.*` and `theme.*` methods.

use serde::{Deserialize, Serialize};
use socialspark_core::application::{JobStatus, ThemeView};
use socialspark_core::domain::{JobState, MoodTheme};
use std::collections::BTreeMap;

/// content.submit.v1 - Upload an image and start a job
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Raw base64, or a `data:<mime>;base64,` URI
    pub image_base64: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Omitted: follow the auto-theme switch
    #[serde(default)]
    pub wants_theme: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub state: JobState,
}

/// content.status.v1 - Poll a job
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub job_id: String,
    pub state: JobState,
    /// Epoch milliseconds
    pub submitted_at: i64,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<MoodTheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<JobStatus> for StatusResponse {
    fn from(status: JobStatus) -> Self {
        let content = status.content;
        Self {
            job_id: status.job_id,
            state: status.state,
            submitted_at: status.submitted_at,
            progress: status.progress,
            caption: content.as_ref().map(|c| c.caption().to_string()),
            hashtags: content.as_ref().map(|c| c.hashtags().to_vec()),
            theme: content.as_ref().and_then(|c| c.theme()),
            notice: status.notice,
            error: status.error,
        }
    }
}

/// theme.auto.v1 - Toggle auto-theme
#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeAutoRequest {
    pub enabled: bool,
}

/// theme.auto.v1 / theme.current.v1 result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub auto_theme: bool,
    pub current_theme: Option<MoodTheme>,
    pub variables: BTreeMap<String, String>,
}

impl From<ThemeView> for ThemeResponse {
    fn from(view: ThemeView) -> Self {
        Self {
            auto_theme: view.auto_theme,
            current_theme: view.current_theme,
            variables: view.variables,
        }
    }
}
