//! `WebSocket` session handler for the shared clicker.
//!
//! Clients connect to `GET /ws/clicker`. Each session goes through
//! `Connecting -> Open -> Closed`:
//!
//! - **Connecting -> Open**: the connection is registered with the hub,
//!   which unicasts the current counter value.
//! - **Open**: a text frame equal to [`CLICK_SIGNAL`] increments the
//!   counter and broadcasts the new value to every client. Other
//!   payloads are ignored. Values queued by the hub are written out as
//!   decimal text frames.
//! - **Open -> Closed**: peer close, read error, write error, eviction by
//!   the hub, or idle timeout. The connection is deregistered on every
//!   one of these paths.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use clicker_core::{ClickerHub, Connection};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::state::AppState;

/// The inbound text payload that means "increment".
pub const CLICK_SIGNAL: &str = "click";

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Close frame or end of stream from the peer.
    PeerClosed,
    /// Reading from the socket failed.
    ReadError,
    /// Writing to the socket failed.
    WriteError,
    /// The hub dropped this connection after a failed delivery.
    Evicted,
    /// Nothing arrived from the peer within the idle timeout.
    IdleTimeout,
}

/// Upgrade an HTTP request to a clicker `WebSocket` session.
///
/// # Route
///
/// `GET /ws/clicker`
pub async fn ws_clicker(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

/// Run one session from registration to deregistration.
async fn handle_session(mut socket: WebSocket, state: Arc<AppState>) {
    let (connection, mut outbound) = Connection::channel(state.outbound_buffer);
    let id = connection.id();

    if let Err(e) = state.hub.connect(connection).await {
        warn!(connection = %id, error = %e, "Refusing clicker connection");
        if socket.send(Message::Close(None)).await.is_err() {
            debug!(connection = %id, "Close frame not delivered");
        }
        return;
    }

    let end = run_session(&mut socket, &state.hub, &mut outbound, state.idle_timeout).await;

    state.hub.disconnect(id).await;
    debug!(connection = %id, reason = ?end, "Clicker session closed");
}

/// The `Open` state: pump outbound values and react to inbound frames
/// until something ends the session.
async fn run_session(
    socket: &mut WebSocket,
    hub: &ClickerHub,
    outbound: &mut mpsc::Receiver<u64>,
    idle_timeout: Option<Duration>,
) -> SessionEnd {
    let mut deadline = idle_timeout.and_then(|t| Instant::now().checked_add(t));

    loop {
        tokio::select! {
            // A value queued by the hub (initial snapshot or broadcast).
            value = outbound.recv() => {
                let Some(value) = value else {
                    return SessionEnd::Evicted;
                };
                if socket.send(Message::Text(value.to_string().into())).await.is_err() {
                    return SessionEnd::WriteError;
                }
            }
            // A frame from the peer.
            msg = socket.recv() => {
                deadline = idle_timeout.and_then(|t| Instant::now().checked_add(t));
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.as_str() == CLICK_SIGNAL {
                            hub.click().await;
                        } else {
                            trace!(len = text.len(), "Ignoring unrecognized text payload");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return SessionEnd::PeerClosed;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket read error: {e}");
                        return SessionEnd::ReadError;
                    }
                    Some(Ok(_)) => {
                        // Pings are answered by the protocol layer; binary
                        // and pong frames carry no meaning here.
                    }
                }
            }
            () = idle_expired(deadline) => {
                return SessionEnd::IdleTimeout;
            }
        }
    }
}

/// Resolves at `deadline`, or never if there is none.
async fn idle_expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
