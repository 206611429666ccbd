//! The generation capability seam: options sent with every call, the response shape expected
//! back, and the `GenerationClient` trait implemented by the live and mock bridges.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Harm categories understood by the upstream safety filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmBlockThreshold {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
    BlockNone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Fixed per-endpoint sampling and safety parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationOptions {
    /// Short single recommendation.
    pub fn recommendation() -> Self {
        Self {
            max_output_tokens: 300,
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            safety_settings: default_safety_settings(),
        }
    }

    /// Longer multi-analysis synthesis.
    pub fn synthesis() -> Self {
        Self {
            max_output_tokens: 800,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            safety_settings: default_safety_settings(),
        }
    }
}

fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockMediumAndAbove,
    })
    .collect()
}

/// Upstream response. Only the fields needed to locate the generated text are modelled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCandidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerationResponse {
    /// Response carrying a single text candidate.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: vec![ResponseCandidate {
                content: Some(CandidateContent {
                    parts: vec![ContentPart {
                        text: Some(text.into()),
                    }],
                }),
                finish_reason: Some("STOP".to_string()),
            }],
            prompt_feedback: None,
        }
    }

    /// Text at `candidates[0].content.parts[0].text`, or the reason it is unusable.
    pub fn into_text(self) -> Result<String, GenerationError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationError::SafetyBlocked(reason));
        }
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyCandidates)?;
        let text = candidate
            .content
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty());
        match (text, candidate.finish_reason) {
            (Some(text), _) => Ok(text),
            (None, Some(reason)) if reason == "SAFETY" => {
                Err(GenerationError::SafetyBlocked(reason))
            }
            (None, _) => Err(GenerationError::EmptyText),
        }
    }
}

/// `generate(prompt, modelId, options) → response or failure`.
///
/// Implementations are created once at startup and shared across requests, so they must not
/// mutate per-call configuration.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        model_id: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResponse, GenerationError>;

    /// Name reported as `modelUsed` when `model_id` answers through this client.
    fn model_label(&self, model_id: &str) -> String {
        model_id.to_string()
    }
}
