// Gemini backend: one client implementing all three inference ports

use crate::client::GeminiClient;
use crate::prompts::{self, CaptionOutput, HashtagsOutput, MoodOutput};
use async_trait::async_trait;
use socialspark_core::port::{
    CaptionGenerator, CaptionRequest, HashtagGenerator, HashtagRequest, InferenceError,
    MoodClassifier, MoodRequest,
};

#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: GeminiClient,
}

impl GeminiBackend {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CaptionGenerator for GeminiBackend {
    async fn generate_caption(&self, request: CaptionRequest<'_>) -> Result<String, InferenceError> {
        let output: CaptionOutput = self
            .client
            .generate_json(
                "caption",
                &prompts::caption_prompt(request.description),
                request.image,
                prompts::caption_schema(),
            )
            .await?;
        Ok(output.caption)
    }
}

#[async_trait]
impl HashtagGenerator for GeminiBackend {
    async fn generate_hashtags(
        &self,
        request: HashtagRequest<'_>,
    ) -> Result<Vec<String>, InferenceError> {
        let output: HashtagsOutput = self
            .client
            .generate_json(
                "hashtags",
                &prompts::hashtags_prompt(request.description),
                request.image,
                prompts::hashtags_schema(),
            )
            .await?;
        Ok(output.hashtags)
    }
}

#[async_trait]
impl MoodClassifier for GeminiBackend {
    async fn classify_mood(&self, request: MoodRequest<'_>) -> Result<String, InferenceError> {
        let output: MoodOutput = self
            .client
            .generate_json(
                "mood_theme",
                prompts::MOOD_PROMPT,
                request.image,
                prompts::mood_schema(),
            )
            .await?;
        Ok(output.theme)
    }
}
