//! Common test utilities for Pathsum
//!
//! Shared fixtures: a mock upstream completion API (wiremock) and a test
//! server wired against it with retry delays shrunk to keep tests fast.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pathsum::{routes, AppState, Config};

/// Test configuration constants
pub mod constants {
    /// API key presented to the mock upstream
    pub const TEST_API_KEY: &str = "test-upstream-api-key";
    /// Model identifier used in test requests
    pub const TEST_MODEL: &str = "test-model";
}

/// Build a config pointing at the mock upstream.
///
/// The backoff base is milliseconds so exhaustion tests finish quickly.
pub fn test_config(upstream_url: &str) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstream_api_url: upstream_url.to_string(),
        upstream_api_key: constants::TEST_API_KEY.to_string(),
        upstream_model: constants::TEST_MODEL.to_string(),
        max_tokens: 256,
        temperature: 0.2,
        top_p: 0.95,
        retry_max_attempts: 4,
        retry_base_delay_secs: 0.01,
    }
}

/// Test harness: mock upstream plus a server running the real router
pub struct TestHarness {
    pub server: TestServer,
    pub upstream: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        let upstream = MockServer::start().await;
        let config = test_config(&upstream.uri());
        let state = Arc::new(AppState::new(config).expect("Failed to build app state"));
        let app = routes::create_router(state);
        let server = TestServer::new(app).expect("Failed to create test server");
        Self { server, upstream }
    }

    /// Requests the mock upstream received on the completions path
    pub async fn upstream_requests(&self) -> Vec<wiremock::Request> {
        self.upstream
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == "/chat/completions")
            .collect()
    }
}

/// Mock upstream completion API responses
pub mod upstream_mocks {
    use super::*;
    use serde_json::json;

    /// Successful completion returning `content`
    pub async fn mock_completion(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-test123",
                "object": "chat.completion",
                "created": 1706745600,
                "model": constants::TEST_MODEL,
                "choices": [
                    {
                        "index": 0,
                        "message": {
                            "role": "assistant",
                            "content": content
                        },
                        "finish_reason": "stop"
                    }
                ],
                "usage": {
                    "prompt_tokens": 120,
                    "completion_tokens": 40,
                    "total_tokens": 160
                }
            })))
            .mount(server)
            .await;
    }

    /// Streaming completion delivering `chunks` as SSE content deltas
    pub async fn mock_completion_stream(server: &MockServer, chunks: &[&str]) {
        let mut body = String::new();
        for chunk in chunks {
            let frame = json!({
                "id": "chatcmpl-test123",
                "object": "chat.completion.chunk",
                "created": 1706745600,
                "model": constants::TEST_MODEL,
                "choices": [
                    {
                        "index": 0,
                        "delta": { "content": chunk },
                        "finish_reason": null
                    }
                ]
            });
            body.push_str(&format!("data: {frame}\n\n"));
        }
        body.push_str("data: [DONE]\n\n");

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/event-stream")
                    .insert_header("cache-control", "no-cache"),
            )
            .mount(server)
            .await;
    }

    /// Permanent 429 carrying a provider retry hint in the body
    pub async fn mock_rate_limited(server: &MockServer, message: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string(message.to_string()))
            .mount(server)
            .await;
    }

    /// Permanent 503, classified as a transient connection failure
    pub async fn mock_unavailable(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
            .mount(server)
            .await;
    }

    /// Non-retryable upstream rejection (bad request)
    pub async fn mock_bad_request(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
            .mount(server)
            .await;
    }
}
