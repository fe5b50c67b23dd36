//! Test helpers for relay integration tests.
//!
//! Provides a port-0 server launcher and a thin JSON-over-WebSocket
//! client wrapper.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use partyline::config::{RelayConfig, ServerConfig};
use partyline::RelayServer;

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a relay server on an OS-assigned port.
pub async fn start_server() -> SocketAddr {
    let server_config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
    };
    let server = RelayServer::new(&server_config, &RelayConfig::default());
    server.run_with_addr().await.unwrap()
}

/// Open a WebSocket connection to the relay.
pub async fn connect(addr: SocketAddr) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    ws
}

/// Send one JSON event.
pub async fn send_json(ws: &mut Ws, value: Value) {
    ws.send(WsMessage::Text(value.to_string().into()))
        .await
        .unwrap();
}

/// Receive the next JSON event, skipping non-text frames.
pub async fn recv_json(ws: &mut Ws) -> Value {
    loop {
        let frame = tokio::time::timeout(DEFAULT_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection ended unexpectedly")
            .unwrap();
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Register and consume the history event plus the client's own join
/// presence. Returns the history event.
pub async fn register(ws: &mut Ws, user_id: &str, username: &str) -> Value {
    send_json(
        ws,
        json!({"event": "register", "userId": user_id, "username": username}),
    )
    .await;
    let history = recv_json(ws).await;
    assert_eq!(history["event"], "history");
    let presence = recv_json(ws).await;
    assert_eq!(presence["event"], "presence");
    assert_eq!(presence["type"], "join");
    history
}
