//! Coach pipeline: Context Builder → Model Fallback Executor → Output Normalizer or
//! Fallback Responder.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::CoachConfig;
use crate::context_builder::{build_recommendation_prompt, build_synthesis_prompt};
use crate::executor::{GenerationOutcome, ModelFallbackExecutor};
use crate::fallback::{recommendation_fallback, synthesis_fallback, FALLBACK_MODEL};
use crate::generation::{GenerationClient, GenerationOptions};
use crate::llm_mode::client_for_mode;
use crate::normalizer::{normalize, RECOMMENDATION_MAX_WORDS};
use crate::request::{RecommendationRequest, SynthesisRequest};

/// `{ text, modelUsed, success }`. `text` comes from exactly one source: the model named by
/// `model_used`, or the fallback responder when `model_used == "fallback"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub text: String,
    pub model_used: String,
    pub success: bool,
}

impl ResponsePayload {
    fn generated(text: String, model_id: String) -> Self {
        Self {
            text,
            model_used: model_id,
            success: true,
        }
    }

    fn fallback(text: String) -> Self {
        Self {
            text,
            model_used: FALLBACK_MODEL.to_string(),
            success: true,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.model_used == FALLBACK_MODEL
    }
}

/// Stateless per request; shares only the executor's client handle.
#[derive(Clone)]
pub struct CoachService {
    executor: ModelFallbackExecutor,
    recommendation_models: Arc<[String]>,
    synthesis_models: Arc<[String]>,
}

impl CoachService {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        recommendation_models: Vec<String>,
        synthesis_models: Vec<String>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            executor: ModelFallbackExecutor::new(client, attempt_timeout),
            recommendation_models: recommendation_models.into(),
            synthesis_models: synthesis_models.into(),
        }
    }

    /// Wire up the client for the configured LLM mode.
    pub fn from_config(config: &CoachConfig) -> Self {
        let client = client_for_mode(
            config.llm_mode(),
            config.resolved_api_key(),
            &config.gemini_api_base,
        );
        Self::new(
            client,
            config.recommendation_models.clone(),
            config.synthesis_models.clone(),
            config.attempt_timeout(),
        )
    }

    pub fn recommendation_models(&self) -> &[String] {
        &self.recommendation_models
    }

    pub fn synthesis_models(&self) -> &[String] {
        &self.synthesis_models
    }

    /// Single recommendation, capped at 150 words.
    pub async fn recommend(&self, request: &RecommendationRequest) -> ResponsePayload {
        let prompt = build_recommendation_prompt(request);
        let outcome = self
            .executor
            .execute(
                &prompt,
                &self.recommendation_models,
                &GenerationOptions::recommendation(),
            )
            .await;

        match outcome {
            GenerationOutcome::Success { text, model_id } => {
                ResponsePayload::generated(normalize(&text, RECOMMENDATION_MAX_WORDS), model_id)
            }
            GenerationOutcome::Failure { error } => {
                tracing::warn!(error = %error, "[COACH] Recommendation using fallback text");
                ResponsePayload::fallback(recommendation_fallback(request))
            }
        }
    }

    /// Multi-analysis synthesis. Length is left to the prompt instructions; no truncation.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> ResponsePayload {
        let prompt = build_synthesis_prompt(request);
        let outcome = self
            .executor
            .execute(
                &prompt,
                &self.synthesis_models,
                &GenerationOptions::synthesis(),
            )
            .await;

        match outcome {
            GenerationOutcome::Success { text, model_id } => {
                ResponsePayload::generated(text, model_id)
            }
            GenerationOutcome::Failure { error } => {
                tracing::warn!(error = %error, "[COACH] Synthesis using fallback text");
                ResponsePayload::fallback(synthesis_fallback(request))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_camel_case() {
        let payload = ResponsePayload::fallback("text".to_string());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["modelUsed"], "fallback");
        assert_eq!(json["success"], true);
        assert!(payload.is_fallback());
    }

    #[tokio::test]
    async fn mock_mode_service_generates_from_first_model() {
        let service = CoachService::new(
            Arc::new(crate::llm_mode::MockGenerationClient),
            vec!["m1".to_string(), "m2".to_string()],
            vec!["s1".to_string()],
            Duration::from_secs(1),
        );
        let payload = service.recommend(&RecommendationRequest::default()).await;
        assert_eq!(payload.model_used, "mock:m1");
        assert!(!payload.is_fallback());

        let payload = service.synthesize(&SynthesisRequest::default()).await;
        assert_eq!(payload.model_used, "mock:s1");
    }
}
