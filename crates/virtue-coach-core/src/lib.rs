//! Virtue Coach: core library.
//! Prompt building, ordered model fallback, output normalization, and deterministic fallback
//! text for the recommendation and synthesis endpoints.

pub mod coach;
pub mod config;
pub mod context_builder;
pub mod error;
pub mod executor;
pub mod fallback;
pub mod gemini_bridge;
pub mod generation;
pub mod llm_mode;
pub mod normalizer;
pub mod prompts;
pub mod request;

pub use coach::{CoachService, ResponsePayload};
pub use config::CoachConfig;
pub use context_builder::{build_recommendation_prompt, build_synthesis_prompt, PromptSpec, Stage};
pub use error::{GenerationError, RequestError};
pub use executor::{GenerationOutcome, ModelFallbackExecutor};
pub use fallback::{recommendation_fallback, synthesis_fallback, FALLBACK_MODEL};
pub use gemini_bridge::GeminiBridge;
pub use generation::{GenerationClient, GenerationOptions, GenerationResponse};
pub use llm_mode::{LlmMode, MockGenerationClient, MOCK_MODEL_PREFIX};
pub use normalizer::{normalize, RECOMMENDATION_MAX_WORDS};
pub use request::{
    parse_recommendation_request, parse_synthesis_request, RecommendationRequest,
    SynthesisRequest, VirtueAnalysis, VirtueScore,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
