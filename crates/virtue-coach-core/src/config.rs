//! Service configuration: defaults → optional TOML file → `COACH_*` environment.
//!
//! | Key / Env | Default | Description |
//! |-----------|---------|-------------|
//! | `COACH_CONFIG` | `config/coach` | Config file path (extension optional). |
//! | `host` / `COACH_HOST` | `127.0.0.1` | Bind address. |
//! | `port` / `COACH_PORT` | `8000` | HTTP port. |
//! | `environment` / `COACH_ENVIRONMENT` | `production` | `development` exposes 500 details. |
//! | `llm_mode` / `COACH_LLM_MODE` | `mock` | `mock` \| `live`. |
//! | `gemini_api_key` / `COACH_GEMINI_API_KEY` | unset | Falls back to `GEMINI_API_KEY`. |
//! | `attempt_timeout_secs` | `30` | Per-model attempt timeout. |
//! | `recommendation_models`, `synthesis_models` | see below | Comma-separated in env. |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gemini_bridge::DEFAULT_GEMINI_API_BASE;
use crate::llm_mode::LlmMode;

/// Tried in order: lighter and newer models first, heavier fallbacks last.
pub const DEFAULT_RECOMMENDATION_MODELS: &[&str] = &[
    "gemini-2.0-flash-lite",
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

pub const DEFAULT_SYNTHESIS_MODELS: &[&str] =
    &["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

const DEFAULT_CONFIG_PATH: &str = "config/coach";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    pub app_name: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub llm_mode: String,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub attempt_timeout_secs: u64,
    pub recommendation_models: Vec<String>,
    pub synthesis_models: Vec<String>,
}

impl CoachConfig {
    /// Load from `COACH_CONFIG` (or `config/coach`) plus environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("COACH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("app_name", "Virtue Coach")?
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000_i64)?
            .set_default("environment", "production")?
            .set_default("llm_mode", "mock")?
            .set_default("gemini_api_base", DEFAULT_GEMINI_API_BASE)?
            .set_default("attempt_timeout_secs", 30_i64)?
            .set_default("recommendation_models", DEFAULT_RECOMMENDATION_MODELS.to_vec())?
            .set_default("synthesis_models", DEFAULT_SYNTHESIS_MODELS.to_vec())?;

        let built = builder
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("COACH")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("recommendation_models")
                    .with_list_parse_key("synthesis_models")
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        matches!(
            self.environment.trim().to_ascii_lowercase().as_str(),
            "development" | "dev"
        )
    }

    pub fn llm_mode(&self) -> LlmMode {
        LlmMode::parse(&self.llm_mode)
    }

    /// Configured key, else `GEMINI_API_KEY`. Blank values count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key_or(std::env::var("GEMINI_API_KEY").ok())
    }

    fn api_key_or(&self, env_key: Option<String>) -> Option<String> {
        non_blank(self.gemini_api_key.as_deref()).or_else(|| non_blank(env_key.as_deref()))
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
