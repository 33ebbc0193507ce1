//! Upstream completion service abstraction
//!
//! Defines the trait interface for the LLM completion backend, plus the
//! error type whose classification drives the retry policy.

pub mod openai;
pub mod sse;

pub use openai::OpenAiProvider;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

/// Stream of incremental content chunks from a streaming completion
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

/// Failures reported by the upstream completion service
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP 429; the message may carry a provider retry-after hint
    #[error("upstream rate limit: {0}")]
    RateLimited(String),

    /// Connect/timeout failures and gateway-level 502/503/504 responses
    #[error("upstream connection error: {0}")]
    Connection(String),

    /// Any other upstream HTTP error; not retryable
    #[error("upstream API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected completion shape
    #[error("malformed upstream response: {0}")]
    Protocol(String),
}

/// Retry classification of an upstream failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Retryable; the provider asked us to back off
    RateLimited,
    /// Retryable transient transport failure
    Transient,
    /// Not retryable; surface immediately
    Fatal,
}

impl UpstreamError {
    /// Classify this failure for the retry policy
    pub fn retry_class(&self) -> RetryClass {
        match self {
            UpstreamError::RateLimited(_) => RetryClass::RateLimited,
            UpstreamError::Connection(_) => RetryClass::Transient,
            UpstreamError::Api { .. } | UpstreamError::Protocol(_) => RetryClass::Fatal,
        }
    }

    /// Map an upstream HTTP error status and body to an error variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => UpstreamError::RateLimited(body),
            502 | 503 | 504 => {
                UpstreamError::Connection(format!("upstream returned {status}: {body}"))
            }
            _ => UpstreamError::Api {
                status,
                message: body,
            },
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // Transport-level failures (connect, timeout, broken body) are all
        // transient from the caller's point of view.
        UpstreamError::Connection(err.to_string())
    }
}

/// Trait defining the interface to the completion backend
///
/// Implementations handle communication with a specific LLM API while the
/// rest of the application only sees prompts in and text (or chunks) out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging and metrics
    fn name(&self) -> &'static str;

    /// One-shot completion: returns the full generated text
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;

    /// Streaming completion: returns incremental content chunks in arrival order
    async fn complete_stream(&self, prompt: &str) -> Result<ChunkStream, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_classification() {
        let err = UpstreamError::from_status(429, "try again in 30s".into());
        assert_eq!(err.retry_class(), RetryClass::RateLimited);
    }

    #[test]
    fn test_gateway_errors_are_transient() {
        for status in [502, 503, 504] {
            let err = UpstreamError::from_status(status, "unavailable".into());
            assert_eq!(err.retry_class(), RetryClass::Transient, "status {status}");
        }
    }

    #[test]
    fn test_client_errors_are_fatal() {
        for status in [400, 401, 404, 422] {
            let err = UpstreamError::from_status(status, "bad request".into());
            assert_eq!(err.retry_class(), RetryClass::Fatal, "status {status}");
        }
    }

    #[test]
    fn test_protocol_errors_are_fatal() {
        let err = UpstreamError::Protocol("no choices in response".into());
        assert_eq!(err.retry_class(), RetryClass::Fatal);
    }
}
