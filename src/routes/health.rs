//! Landing page and connectivity check
//!
//! - `GET /` - static landing page embedded in the binary
//! - `GET /test` - fixed liveness payload used by the frontend to probe the
//!   backend

use axum::{response::Html, Json};
use serde::Serialize;

/// Connectivity check response
#[derive(Debug, Serialize)]
pub struct ConnectivityResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Serve the embedded landing page
pub async fn landing_page() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// Liveness check endpoint
pub async fn connectivity_check() -> Json<ConnectivityResponse> {
    Json(ConnectivityResponse {
        status: "connected",
        message: "Backend is running",
    })
}
