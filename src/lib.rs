//! Pathsum - clinical pathology summarization service
//!
//! This library provides the core functionality for the Pathsum server.
//! It forwards user-submitted clinical text to an LLM completion API and
//! returns a generated summary, either as a single response or as an
//! incrementally delivered token stream.

pub mod config;
pub mod error;
pub mod prompt;
pub mod retry;
pub mod routes;
pub mod sanitize;
pub mod session;
pub mod summarize;
pub mod upstream;

use std::sync::Arc;

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::retry::RetryPolicy;
pub use crate::session::SessionRegistry;
pub use crate::summarize::Summarizer;
pub use crate::upstream::{CompletionProvider, OpenAiProvider};

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    /// Completion provider for forwarding prompts to the LLM backend
    pub provider: Arc<dyn CompletionProvider>,
    /// Synchronous summarization service (prompt -> retry -> sanitize)
    pub summarizer: Arc<Summarizer>,
    /// Registry routing stop signals to active streaming sessions
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(16)
            .timeout(std::time::Duration::from_secs(300))
            .build()?;

        let provider: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiProvider::new(http_client.clone(), &config));

        let policy = RetryPolicy {
            max_attempts: config.retry_max_attempts,
            base_delay: std::time::Duration::from_secs_f64(config.retry_base_delay_secs),
        };

        let summarizer = Arc::new(Summarizer::new(provider.clone(), policy));

        Ok(Self {
            config,
            http_client,
            provider,
            summarizer,
            sessions: Arc::new(SessionRegistry::new()),
        })
    }
}
