//! HTTP error responses: 400 `{ error }` and 500 `{ error, details? }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use virtue_coach_core::RequestError;

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    /// `details` is only populated in development.
    Internal {
        message: &'static str,
        details: Option<String>,
    },
}

impl ApiError {
    pub(crate) fn internal(message: &'static str, details: String, development: bool) -> Self {
        ApiError::Internal {
            message,
            details: development.then_some(details),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": error })),
            )
                .into_response(),
            ApiError::Internal { message, details } => {
                let body = match details {
                    Some(details) => serde_json::json!({ "error": message, "details": details }),
                    None => serde_json::json!({ "error": message }),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
