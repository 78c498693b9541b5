//! Gemini REST client
//!
//! One multimodal `generateContent` call per prompt: the image goes inline as
//! base64, the prompt as text, and the response is constrained to JSON by a
//! response schema.
//!
//! Failure mapping:
//! - HTTP 503, connect errors and timeouts → `Transient`
//! - any other non-success status → `Rejected`
//! - a candidate with no text (blocked, safety stop) → `Rejected`
//! - unparseable envelope or output → `SchemaViolation`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use socialspark_core::domain::ImagePayload;
use socialspark_core::port::InferenceError;
use socialspark_core::{AppError, Result};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Connection settings for the Gemini API
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

// Keeps the API key out of logs
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Part<'a> {
    InlineData { mime_type: &'a str, data: String },
    Text(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn output_text(&self) -> std::result::Result<String, InferenceError> {
        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| InferenceError::rejected("response has no candidates"))?;

        let text: String = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(InferenceError::rejected(format!(
                "candidate has no text (finish reason {})",
                reason
            )));
        }
        Ok(text)
    }
}

/// Thin Gemini API client shared by all three prompts
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// # Errors
    /// - `AppError::Config` if the API key is blank or the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::Config("Gemini API key is not set".to_string()));
        }

        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.request_timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Run one prompt over `image` and decode the JSON output as `T`
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        prompt: &str,
        image: &ImagePayload,
        response_schema: Value,
    ) -> std::result::Result<T, InferenceError> {
        let request = GenerateContentRequest {
            contents: [Content {
                parts: vec![
                    Part::InlineData {
                        mime_type: image.mime_type(),
                        data: STANDARD.encode(image.bytes()),
                    },
                    Part::Text(prompt),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema,
            },
        };

        debug!(
            operation = operation,
            model = %self.config.model,
            image_bytes = image.len(),
            "Calling Gemini"
        );

        let url = format!("{}?key={}", self.config.endpoint(), self.config.api_key);
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let err = map_status(status, &body);
            warn!(
                operation = operation,
                status = status.as_u16(),
                kind = %err.kind,
                "Gemini returned an error status"
            );
            return Err(err);
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            InferenceError::schema_violation(format!("malformed response envelope: {}", e))
        })?;

        parse_output(&envelope.output_text()?)
    }
}

/// Decode model output, tolerating a surrounding markdown code fence
fn parse_output<T: DeserializeOwned>(text: &str) -> std::result::Result<T, InferenceError> {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text).trim();

    serde_json::from_str(text).map_err(|e| {
        InferenceError::schema_violation(format!("output does not match schema: {}", e))
    })
}

fn map_status(status: StatusCode, body: &str) -> InferenceError {
    let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
    let message = format!("HTTP {}: {}", status, preview.trim());
    if status == StatusCode::SERVICE_UNAVAILABLE {
        InferenceError::transient(message)
    } else {
        InferenceError::rejected(message)
    }
}

// Errors carry the request URL, which includes the API key
fn map_transport_error(err: reqwest::Error) -> InferenceError {
    let transient = err.is_timeout() || err.is_connect();
    let message = format!("request failed: {}", err.without_url());
    if transient {
        InferenceError::transient(message)
    } else {
        InferenceError::rejected(message)
    }
}
