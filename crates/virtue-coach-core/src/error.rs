//! Error types for the coaching pipeline.

use std::time::Duration;

use thiserror::Error;

/// Why a single model attempt did not produce usable text.
///
/// These never reach an HTTP caller directly: the fallback executor absorbs them and only
/// keeps the last one for diagnostics.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("no model candidates configured")]
    NoCandidates,

    #[error("generation API key is not configured")]
    MissingApiKey,

    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("generation response parse failed: {0}")]
    MalformedResponse(String),

    #[error("generation response contained no candidates")]
    EmptyCandidates,

    #[error("generation response contained no text")]
    EmptyText,

    #[error("generation blocked by safety filter: {0}")]
    SafetyBlocked(String),

    #[error("generation attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Malformed request bodies. Maps to a 400 at the HTTP boundary.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("{field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid request body: {0}")]
    Malformed(String),
}
