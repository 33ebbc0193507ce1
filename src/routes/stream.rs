//! Streaming summarization over WebSocket
//!
//! `GET /stream` upgrades to a WebSocket carrying JSON frames. The client
//! starts a session with `{"event":"summarize_stream","text":...}` and may
//! cancel it with `{"event":"stop_stream"}`. The server answers with
//! `{"event":"summary_stream", ...}` frames carrying a `token`, a terminal
//! `error`, or the terminal `final` summary. Connection loss is treated as a
//! stop signal for the active session.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::prompt;
use crate::routes::metrics::record_stream_session;
use crate::session::{self, SessionOutcome, StreamEvent};
use crate::AppState;

/// Event name on every server-to-client frame
const SERVER_EVENT: &str = "summary_stream";

/// Client-to-server frames
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ClientEvent {
    SummarizeStream {
        #[serde(default)]
        text: String,
    },
    StopStream,
}

/// The streaming session currently owned by this connection
struct ActiveSession {
    id: Uuid,
    task: JoinHandle<()>,
}

/// Upgrade handler for `GET /stream`
pub async fn stream_upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Wrap a session event in the server frame envelope
fn envelope(event: &StreamEvent) -> String {
    let mut frame = serde_json::to_value(event).expect("stream event serializes");
    frame["event"] = SERVER_EVENT.into();
    frame.to_string()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut source) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<StreamEvent>(32);

    // Writer task: forwards session events to the client. Ends once the
    // socket breaks or every sender is gone, which in turn tells the
    // session loop its receiver disappeared.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if sink.send(Message::Text(envelope(&event))).await.is_err() {
                break;
            }
        }
    });

    let mut active: Option<ActiveSession> = None;

    while let Some(message) = source.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "WebSocket receive error");
                break;
            }
        };
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Ping/pong handled by axum; binary frames are not part of the protocol
            _ => continue,
        };

        match serde_json::from_str::<ClientEvent>(&text) {
            Ok(ClientEvent::SummarizeStream { text }) => {
                // A terminated session frees the connection for a new one
                if active
                    .as_ref()
                    .is_some_and(|session| session.task.is_finished())
                {
                    active = None;
                }
                if let Some(session) = &active {
                    warn!(
                        session_id = %session.id,
                        "summarize_stream ignored, session already active"
                    );
                    continue;
                }
                active = start_session(&state, text, event_tx.clone()).await;
            }
            Ok(ClientEvent::StopStream) => match &active {
                Some(session) => {
                    state.sessions.cancel(session.id);
                }
                None => warn!("stop_stream with no active session"),
            },
            Err(err) => {
                warn!(error = %err, "Unparseable stream frame");
            }
        }
    }

    // Connection gone: equivalent to a stop signal for the in-flight session
    if let Some(session) = active.take() {
        state.sessions.cancel(session.id);
    }
}

/// Validate the start request and spawn the session loop.
///
/// Empty input is answered with a terminal `error` frame and no session is
/// created. The spawned task owns the upstream stream and unregisters the
/// session when it finishes.
async fn start_session(
    state: &Arc<AppState>,
    raw_text: String,
    events: mpsc::Sender<StreamEvent>,
) -> Option<ActiveSession> {
    let text = prompt::normalize_whitespace(&raw_text);
    if text.is_empty() {
        let _ = events
            .send(StreamEvent::Error {
                error: "empty_input".to_string(),
            })
            .await;
        return None;
    }

    let built = prompt::build_prompt(&text);
    let handle = state.sessions.register();
    let id = handle.id;
    let cancel = handle.flag();
    let provider = state.provider.clone();
    let registry = state.sessions.clone();

    info!(session_id = %id, text_len = text.len(), "Stream session starting");

    let task = tokio::spawn(async move {
        let outcome = match provider.complete_stream(&built).await {
            Ok(chunks) => session::pump_session(chunks, cancel, events).await,
            Err(err) => {
                warn!(session_id = %id, error = %err, "Failed to open upstream stream");
                let _ = events
                    .send(StreamEvent::Error {
                        error: err.to_string(),
                    })
                    .await;
                SessionOutcome::Failed
            }
        };
        registry.remove(id);
        record_stream_session(outcome.label());
        info!(session_id = %id, outcome = outcome.label(), "Stream session finished");
    });

    Some(ActiveSession { id, task })
}
