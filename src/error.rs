//! Error types for Pathsum
//!
//! The taxonomy distinguishes caller errors (empty input), retryable upstream
//! failures surfaced after exhaustion (rate limit, connection), and a generic
//! internal catch-all. Each variant maps to a fixed JSON wire shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("rate limited by upstream: {message}")]
    RateLimited {
        message: String,
        /// Suggested wait before resubmitting, never below five seconds
        retry_after_secs: u64,
    },

    #[error("upstream connection failed: {0}")]
    UpstreamConnection(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable label for logs and metrics
    pub fn outcome_label(&self) -> &'static str {
        match self {
            AppError::EmptyInput => "empty_input",
            AppError::RateLimited { .. } => "rate_limit",
            AppError::UpstreamConnection(_) => "upstream_connection",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::EmptyInput => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "empty_input" }),
            ),
            AppError::RateLimited {
                message,
                retry_after_secs,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({
                    "error": "rate_limit",
                    "message": message,
                    "retry_after": retry_after_secs,
                }),
            ),
            AppError::UpstreamConnection(message) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "upstream_connection",
                    "message": message,
                }),
            ),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
