//! Prometheus metrics endpoint
//!
//! Exposes application metrics in Prometheus format for monitoring.

use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;

/// Global Prometheus handle for metrics export
static PROMETHEUS_HANDLE: Lazy<PrometheusHandle> = Lazy::new(|| {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
});

/// Initialize metrics (call once at startup)
pub fn init_metrics() {
    // Force initialization of the lazy static
    let _ = &*PROMETHEUS_HANDLE;

    metrics::describe_counter!(
        "pathsum_summarize_requests_total",
        "Synchronous summarization requests by outcome"
    );
    metrics::describe_histogram!(
        "pathsum_summarize_duration_seconds",
        "Synchronous summarization duration, retries included"
    );
    metrics::describe_counter!(
        "pathsum_upstream_retries_total",
        "Upstream calls retried after a retryable failure"
    );
    metrics::describe_counter!(
        "pathsum_stream_sessions_total",
        "Finished streaming sessions by outcome"
    );
}

/// Prometheus metrics endpoint handler
pub async fn prometheus_metrics() -> impl IntoResponse {
    PROMETHEUS_HANDLE.render()
}

/// Record one synchronous summarization request
pub fn record_summarize(outcome: &str, duration_secs: f64) {
    metrics::counter!("pathsum_summarize_requests_total", "outcome" => outcome.to_string())
        .increment(1);
    metrics::histogram!("pathsum_summarize_duration_seconds").record(duration_secs);
}

/// Record one finished streaming session
pub fn record_stream_session(outcome: &str) {
    metrics::counter!("pathsum_stream_sessions_total", "outcome" => outcome.to_string())
        .increment(1);
}
