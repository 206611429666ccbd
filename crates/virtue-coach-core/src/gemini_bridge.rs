//! Gemini Bridge: live `GenerationClient` over the `generateContent` REST API. reqwest only.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GenerationError;
use crate::generation::{GenerationClient, GenerationOptions, GenerationResponse, SafetySetting};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Upper bound on any single HTTP exchange, independent of the executor's per-attempt timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
/// Upstream error bodies are cut to this many characters before they reach logs.
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, options: &'a GenerationOptions) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: options.max_output_tokens,
                temperature: options.temperature,
                top_p: options.top_p,
                top_k: options.top_k,
            },
            safety_settings: &options.safety_settings,
        }
    }
}

/// Process-wide Gemini client. Built once at startup; the inner `reqwest::Client` pools
/// connections across requests.
pub struct GeminiBridge {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiBridge {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.into().trim().to_string(),
            api_base: api_base.into().trim().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Bridge using the public Gemini endpoint.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_GEMINI_API_BASE)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model_id)
    }
}

#[async_trait]
impl GenerationClient for GeminiBridge {
    async fn generate(
        &self,
        prompt: &str,
        model_id: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, GenerationError> {
        if !self.has_api_key() {
            return Err(GenerationError::MissingApiKey);
        }

        let body = GenerateContentRequest::new(prompt, options);
        let res = self
            .client
            .post(self.endpoint(model_id))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_upstream_field_names() {
        let options = GenerationOptions::recommendation();
        let body = serde_json::to_value(GenerateContentRequest::new("Hello", &options)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 300);
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert!(body["generationConfig"]["topP"].as_f64().is_some());
        assert_eq!(body["safetySettings"].as_array().map(|a| a.len()), Some(4));
        assert_eq!(
            body["safetySettings"][3]["category"],
            "HARM_CATEGORY_DANGEROUS_CONTENT"
        );
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let bridge = GeminiBridge::new("key", "https://example.test/v1beta/");
        assert_eq!(
            bridge.endpoint("gemini-2.0-flash"),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let bridge = GeminiBridge::with_api_key("   ");
        assert!(!bridge.has_api_key());
        let result = bridge
            .generate("prompt", "gemini-2.0-flash", &GenerationOptions::recommendation())
            .await;
        assert!(matches!(result, Err(GenerationError::MissingApiKey)));
    }
}
