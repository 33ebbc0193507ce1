//! HTTP routes for Pathsum
//!
//! This module defines all endpoints exposed by the service, including the
//! WebSocket upgrade for streaming summarization.

pub mod health;
pub mod metrics;
pub mod stream;
pub mod summarize;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // The landing page and API may be served from different origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health::landing_page))
        .route("/test", get(health::connectivity_check))
        .route("/summarize", post(summarize::summarize))
        .route("/stream", get(stream::stream_upgrade))
        .route("/metrics", get(metrics::prometheus_metrics))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
