//! Synchronous summarization endpoint
//!
//! `POST /summarize` with body `{"text": string}` returns
//! `{"summary": string}` or a typed error (400 empty input, 429 rate
//! limited, 502 upstream connection failure, 500 otherwise).

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppResult;
use crate::routes::metrics::record_summarize;
use crate::AppState;

/// Summarization request body
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: String,
}

/// Summarization response body
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Handle a one-shot summarization request
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> AppResult<Json<SummarizeResponse>> {
    let start = Instant::now();
    debug!(text_len = request.text.len(), "Summarization request received");

    let result = state.summarizer.summarize(&request.text).await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(err) => err.outcome_label(),
    };
    record_summarize(outcome, start.elapsed().as_secs_f64());

    let summary = result?;
    Ok(Json(SummarizeResponse { summary }))
}
