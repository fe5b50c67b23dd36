//! WebSocket session handling.
//!
//! One session per accepted connection. A session starts unregistered;
//! the first valid `register` event promotes it via the router. Inbound
//! frames are processed one at a time in arrival order, and each frame
//! is its own error boundary: malformed input is logged and dropped
//! without closing the connection. Whichever way the session ends
//! (client close, transport error, serialization failure), disconnect
//! cleanup runs exactly once.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::relay::{ClientEvent, ConnectionId};

use super::listener::RelayState;

/// WebSocket relay handler.
///
/// GET /ws, unauthenticated; identity is claimed later via `register`.
pub async fn relay_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let conn_id = ConnectionId::new();
    debug!(%conn_id, "connection accepted");

    let (outbox_tx, mut outbox_rx) = mpsc::channel(state.outbox_capacity);
    state.router.switchboard().attach(conn_id, outbox_tx).await;

    // Split the socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    loop {
        tokio::select! {
            // Inbound frames from the client
            inbound = ws_receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_frame(&state, conn_id, &text).await;
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(%conn_id, "closed by client");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(%conn_id, "websocket error: {e}");
                        break;
                    }
                    None => break,
                }
            }

            // Events routed to this connection
            outbound = outbox_rx.recv() => {
                match outbound {
                    Some(event) => match serde_json::to_string(&event) {
                        Ok(json) => {
                            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(%conn_id, "failed to serialize outbound event: {e}");
                        }
                    },
                    None => break,
                }
            }
        }
    }

    // Cleanup runs exactly once, whatever ended the session.
    state.router.handle_disconnect(conn_id).await;
    debug!(%conn_id, "session ended");
}

/// Parse and route one inbound frame.
///
/// The per-event error boundary: a frame that is not valid JSON or not
/// a known event is logged and dropped, and the session keeps running.
async fn dispatch_frame(state: &RelayState, conn_id: ConnectionId, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => state.router.handle_event(conn_id, event).await,
        Err(e) => {
            debug!(%conn_id, "dropping malformed client event: {e}");
        }
    }
}
