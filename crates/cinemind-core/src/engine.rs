use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use cinemind_provider::{
    CompletionProvider, CompletionRequest, GeminiClient, ProviderError,
};
use cinemind_schema::{RecommendationResponse, UserPreferences};

use crate::prompt::{build_prompt, response_schema, SYSTEM_INSTRUCTION};
use crate::settings::Settings;

/// The one string users ever see for a failed search; the underlying error
/// goes to the log only.
pub const USER_FACING_ERROR: &str =
    "Failed to generate recommendations. Please try again or check your API key.";

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("no Gemini API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("recommendation payload was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RecommendError {
    pub fn user_message(&self) -> &'static str {
        USER_FACING_ERROR
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub model: String,
    pub temperature: f32,
    pub recommendation_count: usize,
    pub max_output_tokens: u32,
}

impl From<&Settings> for EngineSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            recommendation_count: settings.recommendation_count,
            max_output_tokens: settings.max_output_tokens,
        }
    }
}

/// Issues one completion request per search and turns the reply into a typed
/// recommendation batch. No caching, no retries; identical submissions hit
/// the provider again.
pub struct RecommendationEngine {
    provider: Option<Arc<dyn CompletionProvider>>,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(settings: EngineSettings, provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider, settings }
    }

    /// Wire up a Gemini client when a credential is present; without one the
    /// engine is built credential-less and every search fails fast.
    pub fn from_settings(settings: &Settings) -> Self {
        let provider: Option<Arc<dyn CompletionProvider>> = if settings.api_key.is_empty() {
            None
        } else {
            let mut client = GeminiClient::new(settings.api_key.clone());
            if let Some(base_url) = &settings.base_url {
                client = client.with_base_url(base_url.clone());
            }
            Some(Arc::new(client))
        };
        Self::new(EngineSettings::from(settings), provider)
    }

    pub fn has_credential(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn get_recommendations(
        &self,
        prefs: &UserPreferences,
    ) -> Result<RecommendationResponse, RecommendError> {
        let provider = self.provider.as_ref().ok_or(RecommendError::MissingApiKey)?;

        let trace_id = Uuid::new_v4();
        let prompt = build_prompt(prefs, self.settings.recommendation_count);
        tracing::info!(%trace_id, model = %self.settings.model, "requesting recommendations");

        let completion = provider
            .complete(CompletionRequest {
                model: self.settings.model.clone(),
                system: Some(SYSTEM_INSTRUCTION.to_string()),
                prompt,
                temperature: Some(self.settings.temperature),
                max_output_tokens: Some(self.settings.max_output_tokens),
                response_schema: Some(response_schema()),
            })
            .await
            .inspect_err(|e| tracing::warn!(%trace_id, error = %e, "provider call failed"))?;

        if completion.text.trim().is_empty() {
            tracing::info!(%trace_id, "provider returned no text, treating as empty batch");
            return Ok(RecommendationResponse::default());
        }

        let mut parsed: RecommendationResponse = serde_json::from_str(&completion.text)
            .inspect_err(|e| tracing::warn!(%trace_id, error = %e, "response text did not match schema"))?;

        let batch = Utc::now().timestamp_millis();
        for (idx, movie) in parsed.recommendations.iter_mut().enumerate() {
            movie.id = format!("movie-{batch}-{idx}");
        }

        tracing::info!(%trace_id, count = parsed.recommendations.len(), "recommendations parsed");
        Ok(parsed)
    }
}
