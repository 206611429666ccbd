//! Model Fallback Executor: try each model id in order until one yields usable text.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context_builder::PromptSpec;
use crate::error::GenerationError;
use crate::generation::{GenerationClient, GenerationOptions};

/// Result of running a prompt through the candidate list.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// `model_id` is the client's label for the answering candidate.
    Success { text: String, model_id: String },
    /// Every candidate failed. Only the last attempt's error is kept.
    Failure { error: GenerationError },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }
}

/// Sequential, first-success-wins iteration over model candidates.
///
/// Holds the process-wide client handle; cloning is cheap and shares the handle.
#[derive(Clone)]
pub struct ModelFallbackExecutor {
    client: Arc<dyn GenerationClient>,
    attempt_timeout: Duration,
}

impl ModelFallbackExecutor {
    pub fn new(client: Arc<dyn GenerationClient>, attempt_timeout: Duration) -> Self {
        Self {
            client,
            attempt_timeout,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Attempts run one at a time in list order. A later candidate is never invoked once an
    /// earlier one succeeds.
    pub async fn execute(
        &self,
        prompt: &PromptSpec,
        candidates: &[String],
        options: &GenerationOptions,
    ) -> GenerationOutcome {
        let mut last_error = GenerationError::NoCandidates;

        for (index, model_id) in candidates.iter().enumerate() {
            let attempt = index + 1;
            tracing::info!(model = %model_id, attempt, "[COACH] Trying model");
            let started = Instant::now();

            let result = match tokio::time::timeout(
                self.attempt_timeout,
                self.client.generate(prompt.as_str(), model_id, options),
            )
            .await
            {
                Ok(response) => response.and_then(|r| r.into_text()),
                Err(_) => Err(GenerationError::Timeout(self.attempt_timeout)),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(text) => {
                    tracing::info!(model = %model_id, attempt, elapsed_ms, "[COACH] Model succeeded");
                    return GenerationOutcome::Success {
                        text,
                        model_id: self.client.model_label(model_id),
                    };
                }
                Err(error) => {
                    tracing::warn!(
                        model = %model_id,
                        attempt,
                        elapsed_ms,
                        error = %error,
                        "[COACH] Model failed, trying next candidate"
                    );
                    last_error = error;
                }
            }
        }

        tracing::warn!(
            candidates = candidates.len(),
            error = %last_error,
            "[COACH] All model candidates exhausted"
        );
        GenerationOutcome::Failure { error: last_error }
    }
}
