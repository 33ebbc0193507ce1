//! Bounded retry with exponential backoff for upstream calls
//!
//! Applies only to the synchronous summarization path. Failures are
//! classified by the upstream error type; rate-limit errors may carry a
//! provider retry-after hint ("1m30s", "45s") which seeds the backoff base.
//! Sleeping goes through the [`Sleeper`] trait so the schedule is testable
//! without real delays.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::AppError;
use crate::upstream::{RetryClass, UpstreamError};

/// Floor for the retry-after value reported to callers on exhaustion
pub const MIN_RETRY_AFTER_SECS: u64 = 5;

/// Accepted hint formats: optional whole minutes, then seconds ("1m30s", "45s", "0.5s")
static RETRY_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:(\d+)m)?(\d+(?:\.\d+)?)s").expect("invalid retry hint regex"));

/// Abstraction over backoff sleeping, injected for testability
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry policy parameters
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total upstream calls allowed (1 initial + retries)
    pub max_attempts: u32,
    /// Backoff base when the provider gives no hint
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Successful outcome of a retried call
#[derive(Debug)]
pub struct RetryOutcome {
    pub content: String,
    /// Upstream calls made, including the successful one
    pub attempts: u32,
}

/// Parse a provider retry-after hint out of an error message.
///
/// Scans for the first duration of the form `[<minutes>m]<seconds>s`
/// anywhere in the message, e.g. "Please try again in 1m30s."
pub fn parse_retry_hint(message: &str) -> Option<Duration> {
    let caps = RETRY_HINT.captures(message)?;
    let minutes: u64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    let seconds: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(Duration::from_secs_f64(minutes as f64 * 60.0 + seconds))
}

/// Run `call` under the retry policy.
///
/// The delay before retry `n` (counting failures from 1) is
/// `base * 2^(n-1)`, where `base` is the parsed rate-limit hint or the
/// policy default. Fatal failures surface immediately; exhausted retryable
/// failures surface as a typed rate-limit or connection error.
pub async fn run<F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut call: F,
) -> Result<RetryOutcome, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, UpstreamError>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let err = match call().await {
            Ok(content) => {
                return Ok(RetryOutcome { content, attempts: attempt });
            }
            Err(err) => err,
        };

        if err.retry_class() == RetryClass::Fatal {
            return Err(AppError::Internal(anyhow::Error::new(err)));
        }

        let base = match &err {
            UpstreamError::RateLimited(message) => {
                parse_retry_hint(message).unwrap_or(policy.base_delay)
            }
            _ => policy.base_delay,
        };

        if attempt >= policy.max_attempts {
            return Err(exhausted(err, base));
        }

        let delay = base * 2u32.pow(attempt - 1);
        warn!(
            attempt,
            delay_secs = delay.as_secs_f64(),
            error = %err,
            "Upstream call failed, backing off"
        );
        metrics::counter!("pathsum_upstream_retries_total").increment(1);
        sleeper.sleep(delay).await;
    }
}

/// Map the final failure after exhausted retries to a caller-facing error
fn exhausted(err: UpstreamError, base: Duration) -> AppError {
    match err {
        UpstreamError::RateLimited(message) => AppError::RateLimited {
            message,
            retry_after_secs: (base.as_secs_f64().ceil() as u64).max(MIN_RETRY_AFTER_SECS),
        },
        other => AppError::UpstreamConnection(other.to_string()),
    }
}
