//! Streaming session management
//!
//! One session per in-flight streaming summarization. The session loop
//! relays upstream chunks to the client as `token` events, accumulates them,
//! and terminates with exactly one of `error` or `final`. Cancellation is
//! cooperative: a stop signal flips a per-session atomic flag which the loop
//! observes between chunks; the chunk already in flight is not interrupted.
//!
//! The shared registry maps session ids to cancellation flags and exists
//! only to route stop signals. Each flag is touched by at most two actors:
//! the owning session loop and the stop/disconnect handler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::sanitize::sanitize;
use crate::upstream::ChunkStream;

/// Events delivered to the client over the duplex channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    /// One incremental chunk, relayed in arrival order
    Token { token: String },
    /// Terminal failure; no `final` event follows
    Error { error: String },
    /// Terminal sanitized summary built from the accumulated chunks
    Final {
        #[serde(rename = "final")]
        summary: String,
        end: bool,
    },
}

/// How a session loop ended, for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Stream drained (or was cancelled) and the `final` event was delivered
    Completed,
    /// Upstream failed mid-stream and the `error` event was delivered
    Failed,
    /// The client went away before the terminal event could be delivered
    Disconnected,
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::Failed => "failed",
            SessionOutcome::Disconnected => "disconnected",
        }
    }
}

/// Handle to one registered session
pub struct SessionHandle {
    pub id: Uuid,
    cancel: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Clone of the cancellation flag, for handing to the session loop
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }
}

/// Registry routing stop signals to active sessions
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<AtomicBool>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh session and return its handle
    pub fn register(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        self.sessions
            .write()
            .unwrap()
            .insert(id, cancel.clone());
        debug!(session_id = %id, "Stream session registered");
        SessionHandle { id, cancel }
    }

    /// Request cancellation of a session. Returns false for unknown ids.
    pub fn cancel(&self, id: Uuid) -> bool {
        match self.sessions.read().unwrap().get(&id) {
            Some(flag) => {
                flag.store(true, Ordering::Release);
                debug!(session_id = %id, "Stop signal routed to session");
                true
            }
            None => {
                warn!(session_id = %id, "Stop signal for unknown session");
                false
            }
        }
    }

    /// Drop a terminated session from the registry
    pub fn remove(&self, id: Uuid) {
        self.sessions.write().unwrap().remove(&id);
    }

    /// Number of currently registered sessions
    pub fn active_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

/// Drive one streaming session to termination.
///
/// Relays each upstream chunk as a `token` event and accumulates it. The
/// cancellation flag is checked after each chunk arrives and before it is
/// processed; once set, remaining chunks are discarded and the loop
/// finalizes with whatever was accumulated. Upstream errors emit a terminal
/// `error` event instead of `final`. Exactly one terminal event is emitted
/// unless the receiver is gone.
pub async fn pump_session(
    mut chunks: ChunkStream,
    cancel: Arc<AtomicBool>,
    events: mpsc::Sender<StreamEvent>,
) -> SessionOutcome {
    let mut transcript = String::new();

    while let Some(item) = chunks.next().await {
        if cancel.load(Ordering::Acquire) {
            debug!("Cancellation observed, discarding remaining chunks");
            break;
        }
        match item {
            Ok(chunk) => {
                let event = StreamEvent::Token {
                    token: chunk.clone(),
                };
                if events.send(event).await.is_err() {
                    return SessionOutcome::Disconnected;
                }
                transcript.push_str(&chunk);
            }
            Err(err) => {
                warn!(error = %err, "Upstream stream failed mid-session");
                let event = StreamEvent::Error {
                    error: err.to_string(),
                };
                if events.send(event).await.is_err() {
                    return SessionOutcome::Disconnected;
                }
                return SessionOutcome::Failed;
            }
        }
    }

    let event = StreamEvent::Final {
        summary: sanitize(&transcript),
        end: true,
    };
    if events.send(event).await.is_err() {
        return SessionOutcome::Disconnected;
    }
    SessionOutcome::Completed
}
