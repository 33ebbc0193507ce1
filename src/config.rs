//! Configuration management for Pathsum
//!
//! Configuration is loaded from environment variables once at startup.

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Base URL of the upstream completion API (OpenAI-compatible)
    pub upstream_api_url: String,
    /// API key for the upstream completion API
    pub upstream_api_key: String,
    /// Model identifier sent with every completion request
    pub upstream_model: String,

    /// Upper bound on generated tokens per summary
    pub max_tokens: u32,
    /// Sampling temperature for generation
    pub temperature: f64,
    /// Nucleus sampling cutoff for generation
    pub top_p: f64,

    /// Total upstream calls allowed per synchronous request (1 initial + retries)
    pub retry_max_attempts: u32,
    /// Default backoff base delay when the provider gives no retry hint
    pub retry_base_delay_secs: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("PATHSUM_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PATHSUM_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("Invalid PATHSUM_PORT")?,

            upstream_api_url: env::var("UPSTREAM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            upstream_api_key: env::var("UPSTREAM_API_KEY")
                .context("UPSTREAM_API_KEY must be set")?,
            upstream_model: env::var("UPSTREAM_MODEL")
                .unwrap_or_else(|_| "medgemma-27b-it".to_string()),

            max_tokens: env::var("UPSTREAM_MAX_TOKENS")
                .unwrap_or_else(|_| "512".to_string())
                .parse()
                .context("Invalid UPSTREAM_MAX_TOKENS")?,
            temperature: env::var("UPSTREAM_TEMPERATURE")
                .unwrap_or_else(|_| "0.2".to_string())
                .parse()
                .context("Invalid UPSTREAM_TEMPERATURE")?,
            top_p: env::var("UPSTREAM_TOP_P")
                .unwrap_or_else(|_| "0.95".to_string())
                .parse()
                .context("Invalid UPSTREAM_TOP_P")?,

            retry_max_attempts: env::var("RETRY_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("Invalid RETRY_MAX_ATTEMPTS")?,
            retry_base_delay_secs: env::var("RETRY_BASE_DELAY_SECS")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()
                .context("Invalid RETRY_BASE_DELAY_SECS")?,
        })
    }
}
