//! LLM mode: `mock` (deterministic, offline) or `live` (Gemini Bridge).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::gemini_bridge::GeminiBridge;
use crate::generation::{GenerationClient, GenerationOptions, GenerationResponse};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LlmMode {
    #[default]
    Mock,
    Live,
}

impl LlmMode {
    /// `"live"` (any case) selects the Gemini Bridge; anything else is mock.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("live") {
            LlmMode::Live
        } else {
            LlmMode::Mock
        }
    }
}

/// Prefix on `modelUsed` for replies produced by [`MockGenerationClient`].
pub const MOCK_MODEL_PREFIX: &str = "mock:";

/// Mock generator: returns a deterministic reply tagged with the model id. Never touches the
/// network, so local development works without an API key. Prompt content is not echoed.
#[derive(Debug, Default)]
pub struct MockGenerationClient;

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(
        &self,
        prompt: &str,
        model_id: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationResponse, GenerationError> {
        Ok(GenerationResponse::from_text(format!(
            "[Mock {}] This is a placeholder reply to a {}-word prompt. Choose one small, \
             honest step toward your highest-priority virtue today and notice how it feels.",
            model_id,
            prompt.split_whitespace().count()
        )))
    }

    fn model_label(&self, model_id: &str) -> String {
        format!("{}{}", MOCK_MODEL_PREFIX, model_id)
    }
}

/// Build the shared client handle for the configured mode.
pub fn client_for_mode(
    mode: LlmMode,
    api_key: Option<String>,
    api_base: &str,
) -> Arc<dyn GenerationClient> {
    match mode {
        LlmMode::Mock => Arc::new(MockGenerationClient),
        LlmMode::Live => Arc::new(GeminiBridge::new(api_key.unwrap_or_default(), api_base)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_strings() {
        assert_eq!(LlmMode::parse("live"), LlmMode::Live);
        assert_eq!(LlmMode::parse(" LIVE "), LlmMode::Live);
        assert_eq!(LlmMode::parse("mock"), LlmMode::Mock);
        assert_eq!(LlmMode::parse(""), LlmMode::Mock);
    }

    #[tokio::test]
    async fn mock_reply_is_deterministic_and_tagged() {
        let client = MockGenerationClient;
        let options = GenerationOptions::recommendation();
        let a = client.generate("prompt", "model-x", &options).await.unwrap();
        let b = client.generate("prompt", "model-x", &options).await.unwrap();
        let a = a.into_text().unwrap();
        assert_eq!(a, b.into_text().unwrap());
        assert!(a.contains("model-x"));
    }

    #[tokio::test]
    async fn mock_reply_does_not_echo_the_prompt() {
        let prompt = "You are a supportive recovery coach with a secret template";
        let reply = MockGenerationClient
            .generate(prompt, "model-x", &GenerationOptions::recommendation())
            .await
            .unwrap()
            .into_text()
            .unwrap();
        assert!(!reply.contains("recovery coach"));
        assert!(reply.contains("10-word prompt"));
    }

    #[test]
    fn mock_label_is_distinct_from_the_model_id() {
        assert_eq!(MockGenerationClient.model_label("gemini-2.0-flash"), "mock:gemini-2.0-flash");
    }

    #[tokio::test]
    async fn default_config_reports_mock_source_instead_of_a_bare_model_id() {
        let dir = tempfile::tempdir().unwrap();
        let config = crate::config::CoachConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.llm_mode(), LlmMode::Mock);

        let service = crate::coach::CoachService::from_config(&config);
        let payload = service
            .recommend(&crate::request::RecommendationRequest::default())
            .await;

        assert!(payload.model_used.starts_with(MOCK_MODEL_PREFIX));
        assert!(!config.recommendation_models.contains(&payload.model_used));
        assert!(!payload.text.contains("recovery coach"));
    }
}
