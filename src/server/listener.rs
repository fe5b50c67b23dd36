//! Relay server: HTTP surface and process lifecycle.
//!
//! Exposes the WebSocket endpoint at `/ws` and a liveness endpoint at
//! `/health`. All relay state is memory-resident and lost on restart.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::{RelayConfig, ServerConfig};
use crate::relay::{ConnectionRegistry, MessageLog, Router, Switchboard};

use super::cors::create_cors_layer;
use super::session::relay_ws_handler;

/// Shared state behind the WebSocket endpoint.
pub struct RelayState {
    /// Event router over registry, history and switchboard.
    pub router: Router,
    /// Per-connection outbound queue capacity.
    pub outbox_capacity: usize,
}

impl RelayState {
    /// Build fresh relay state from configuration.
    pub fn from_config(config: &RelayConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let history = Arc::new(MessageLog::with_capacity(config.max_retained));
        let switchboard = Arc::new(Switchboard::new());
        let router = Router::new(registry, history, switchboard, config.replay_limit);
        Self {
            router,
            outbox_capacity: config.outbox_capacity,
        }
    }
}

/// The relay server.
pub struct RelayServer {
    host: String,
    port: u16,
    cors_origins: Vec<String>,
    state: Arc<RelayState>,
}

impl RelayServer {
    /// Create a new relay server.
    pub fn new(server_config: &ServerConfig, relay_config: &RelayConfig) -> Self {
        Self {
            host: server_config.host.clone(),
            port: server_config.port,
            cors_origins: server_config.cors_origins.clone(),
            state: Arc::new(RelayState::from_config(relay_config)),
        }
    }

    /// The shared relay state.
    pub fn state(&self) -> &Arc<RelayState> {
        &self.state
    }

    fn app(&self) -> axum::Router {
        axum::Router::new()
            .route("/ws", get(relay_ws_handler))
            .route("/health", get(health_check))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(create_cors_layer(&self.cors_origins)),
            )
            .with_state(self.state.clone())
    }

    /// Run the relay server until the process exits.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let app = self.app();
        let listener = TcpListener::bind(format!("{}:{}", self.host, self.port)).await?;
        let local_addr = listener.local_addr()?;

        info!("Relay server listening on http://{}", local_addr);

        axum::serve(listener, app).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let app = self.app();
        let listener = TcpListener::bind(format!("{}:{}", self.host, self.port)).await?;
        let local_addr = listener.local_addr()?;

        info!("Relay server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Relay server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

/// Health check handler.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
