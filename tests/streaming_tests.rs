//! Streaming integration tests for Pathsum
//!
//! Drives the OpenAI-compatible provider against a wiremock upstream serving
//! SSE chunk streams, and runs the session loop on top of the decoded
//! stream. Run with `cargo test --test streaming_tests`.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use pathsum::session::{pump_session, SessionOutcome, StreamEvent};
use pathsum::upstream::{CompletionProvider, OpenAiProvider, UpstreamError};

use common::upstream_mocks;

fn provider_against(upstream: &wiremock::MockServer) -> OpenAiProvider {
    let config = common::test_config(&upstream.uri());
    OpenAiProvider::new(reqwest::Client::new(), &config)
}

#[tokio::test]
async fn test_stream_chunks_decoded_in_order() {
    let upstream = wiremock::MockServer::start().await;
    upstream_mocks::mock_completion_stream(&upstream, &["Hemo", "globin", " 9.2 g/dL"]).await;
    let provider = provider_against(&upstream);

    let chunks: Vec<String> = provider
        .complete_stream("prompt")
        .await
        .expect("stream should open")
        .map(|chunk| chunk.expect("chunk should decode"))
        .collect()
        .await;

    assert_eq!(chunks, vec!["Hemo", "globin", " 9.2 g/dL"]);
}

#[tokio::test]
async fn test_session_relays_tokens_then_sanitized_final() {
    let upstream = wiremock::MockServer::start().await;
    upstream_mocks::mock_completion_stream(
        &upstream,
        &["<think>pattern fits iron deficiency</think>", "Microcytic ", "anemia."],
    )
    .await;
    let provider = provider_against(&upstream);

    let chunks = provider.complete_stream("prompt").await.unwrap();
    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel(8);

    let outcome = pump_session(chunks, cancel, tx).await;
    assert_eq!(outcome, SessionOutcome::Completed);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    // Tokens are relayed raw and in order; only the final summary is sanitized
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        StreamEvent::Token {
            token: "<think>pattern fits iron deficiency</think>".into()
        }
    );
    assert_eq!(
        events.last().unwrap(),
        &StreamEvent::Final {
            summary: "Microcytic anemia.".into(),
            end: true
        }
    );
}

#[tokio::test]
async fn test_stream_open_failure_is_connection_error() {
    let upstream = wiremock::MockServer::start().await;
    upstream_mocks::mock_unavailable(&upstream).await;
    let provider = provider_against(&upstream);

    match provider.complete_stream("prompt").await {
        Err(UpstreamError::Connection(_)) => {}
        Err(other) => panic!("expected connection error, got {other:?}"),
        Ok(_) => panic!("expected connection error, got an open stream"),
    }
}
