//! RPC Method Handlers
//!
//! Decodes transport-level inputs and delegates to the generation session.

use crate::error::to_rpc_error;
use crate::types::{
    StatusRequest, StatusResponse, SubmitRequest, SubmitResponse, ThemeAutoRequest, ThemeResponse,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonrpsee::types::ErrorObjectOwned;
use socialspark_core::application::{self, GenerationSession};
use socialspark_core::domain::JobState;
use socialspark_core::error::AppError;
use std::sync::Arc;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    session: Arc<GenerationSession>,
}

impl RpcHandler {
    pub fn new(session: Arc<GenerationSession>) -> Self {
        Self { session }
    }

    /// content.submit.v1
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        let image = decode_image(&params.image_base64).map_err(to_rpc_error)?;
        debug!(image_bytes = image.len(), "Decoded upload");

        let job_id = self
            .session
            .submit(application::SubmitRequest {
                image,
                description: params.description,
                wants_theme: params.wants_theme,
            })
            .await
            .map_err(to_rpc_error)?;

        Ok(SubmitResponse {
            job_id,
            state: JobState::Running,
        })
    }

    /// content.status.v1
    pub async fn status(&self, params: StatusRequest) -> Result<StatusResponse, ErrorObjectOwned> {
        self.session
            .status(&params.job_id)
            .await
            .map(StatusResponse::from)
            .map_err(to_rpc_error)
    }

    /// theme.auto.v1
    pub async fn set_auto_theme(
        &self,
        params: ThemeAutoRequest,
    ) -> Result<ThemeResponse, ErrorObjectOwned> {
        Ok(self.session.set_auto_theme(params.enabled).await.into())
    }

    /// theme.current.v1
    pub async fn current_theme(&self) -> Result<ThemeResponse, ErrorObjectOwned> {
        Ok(self.session.theme_view().await.into())
    }
}

/// Decode raw base64 or a `data:<mime>;base64,<data>` URI
fn decode_image(encoded: &str) -> Result<Vec<u8>, AppError> {
    let encoded = encoded.trim();
    let data = match encoded.strip_prefix("data:") {
        Some(uri) => uri
            .split_once(";base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| AppError::Validation("data URI is not base64-encoded".to_string()))?,
        None => encoded,
    };

    STANDARD
        .decode(data)
        .map_err(|e| AppError::Validation(format!("image_base64 is not valid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use socialspark_core::application::{
        GenerationOrchestrator, ProgressReporter, RetryPolicy, ThemeApplier,
    };
    use socialspark_core::domain::MoodTheme;
    use socialspark_core::port::id_provider::SequentialIdProvider;
    use socialspark_core::port::inference::mocks::ScriptedBackend;
    use socialspark_core::port::time_provider::ManualTimeProvider;
    use socialspark_core::port::InMemoryPresentation;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    fn handler() -> RpcHandler {
        let orchestrator = GenerationOrchestrator::from_backends(
            Arc::new(ScriptedBackend::succeed("Golden hour.".to_string())),
            Arc::new(ScriptedBackend::succeed(vec!["sunset".to_string()])),
            Arc::new(ScriptedBackend::succeed("Calm".to_string())),
            RetryPolicy::default(),
            ProgressReporter::default(),
        );
        let session = GenerationSession::new(
            Arc::new(orchestrator),
            ThemeApplier::new(Box::new(InMemoryPresentation::new()), true),
            Arc::new(SequentialIdProvider::default()),
            Arc::new(ManualTimeProvider::new(0)),
        );
        RpcHandler::new(Arc::new(session))
    }

    #[test]
    fn test_decode_accepts_data_uri() {
        let raw = decode_image(&STANDARD.encode(GIF)).unwrap();
        let uri = decode_image(&format!("data:image/gif;base64,{}", STANDARD.encode(GIF))).unwrap();
        assert_eq!(raw, GIF);
        assert_eq!(uri, GIF);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_image("***not base64***"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            decode_image("data:image/png,rawbytes"),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_then_poll_until_completed() {
        let handler = handler();
        let submitted = handler
            .submit(SubmitRequest {
                image_base64: STANDARD.encode(GIF),
                description: Some("golden hour".to_string()),
                wants_theme: None,
            })
            .await
            .unwrap();
        assert_eq!(submitted.state, JobState::Running);

        let status = loop {
            let status = handler
                .status(StatusRequest {
                    job_id: submitted.job_id.clone(),
                })
                .await
                .unwrap();
            if status.state != JobState::Running {
                break status;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        };

        assert_eq!(status.state, JobState::Completed);
        assert_eq!(status.progress, 100);
        assert_eq!(status.caption.as_deref(), Some("Golden hour."));
        assert_eq!(status.theme, Some(MoodTheme::Calm));
        assert_eq!(
            handler.current_theme().await.unwrap().current_theme,
            Some(MoodTheme::Calm)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_upload_is_validation_error() {
        let err = handler()
            .submit(SubmitRequest {
                image_base64: String::new(),
                description: None,
                wants_theme: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::VALIDATION_ERROR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_job_is_not_found() {
        let err = handler()
            .status(StatusRequest {
                job_id: "job-404".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::NOT_FOUND);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_theme_toggle_round_trip() {
        let handler = handler();
        let view = handler
            .set_auto_theme(ThemeAutoRequest { enabled: false })
            .await
            .unwrap();
        assert!(!view.auto_theme);
        assert!(view.variables.is_empty());
        assert!(!handler.current_theme().await.unwrap().auto_theme);
    }
}
