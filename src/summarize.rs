//! Synchronous summarization service
//!
//! Orchestrates one-shot summarization: validate, build the prompt, call the
//! upstream completion service under the retry policy, sanitize the result.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::prompt;
use crate::retry::{self, RetryPolicy, Sleeper, TokioSleeper};
use crate::sanitize::sanitize;
use crate::upstream::CompletionProvider;

/// One-shot summarization service
pub struct Summarizer {
    provider: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Summarizer {
    /// Create a summarizer with the production tokio-backed sleeper
    pub fn new(provider: Arc<dyn CompletionProvider>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(provider, policy, Arc::new(TokioSleeper))
    }

    /// Create a summarizer with an injected sleeper (used by tests)
    pub fn with_sleeper(
        provider: Arc<dyn CompletionProvider>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            provider,
            policy,
            sleeper,
        }
    }

    /// Summarize one report.
    ///
    /// Whitespace-only input fails with [`AppError::EmptyInput`] before any
    /// upstream call is made. Retries are fully contained here; callers only
    /// observe exhausted-retry outcomes.
    #[instrument(skip(self, raw_text), fields(provider = self.provider.name()))]
    pub async fn summarize(&self, raw_text: &str) -> AppResult<String> {
        let text = prompt::normalize_whitespace(raw_text);
        if text.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let built = prompt::build_prompt(&text);
        let outcome = retry::run(&self.policy, self.sleeper.as_ref(), || {
            self.provider.complete(&built)
        })
        .await?;

        info!(
            attempts = outcome.attempts,
            text_len = text.len(),
            "Summarization completed"
        );

        Ok(sanitize(&outcome.content))
    }
}
