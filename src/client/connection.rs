//! Relay client with automatic reconnection.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::relay::{ClientEvent, ServerEvent};
use crate::{RelayError, Result};

use super::backoff::Backoff;

/// A relay client that keeps itself connected.
///
/// The server retains nothing across a dropped connection, so the client
/// reconnects with unlimited attempts under a jittered, capped
/// exponential backoff and re-registers after every successful connect.
pub struct RelayClient {
    url: String,
    user_id: String,
    username: String,
    backoff: Backoff,
}

impl RelayClient {
    /// Create a client with the default reconnect schedule (500ms - 5s).
    pub fn new(
        url: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            user_id: user_id.into(),
            username: username.into(),
            backoff: Backoff::new(Duration::from_millis(500), Duration::from_secs(5)),
        }
    }

    /// Create a client from bot configuration.
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            url: config.server_url.clone(),
            user_id: config.user_id.clone(),
            username: config.username.clone(),
            backoff: Backoff::new(
                Duration::from_millis(config.reconnect_initial_ms),
                Duration::from_millis(config.reconnect_max_ms),
            ),
        }
    }

    /// The userId this client registers as.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Run until the surrounding task is dropped or aborted.
    ///
    /// `on_event` is invoked for every server event; returning an event
    /// sends it back to the relay.
    pub async fn run<F>(&mut self, mut on_event: F)
    where
        F: FnMut(&ServerEvent) -> Option<ClientEvent>,
    {
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((stream, _)) => {
                    info!(url = %self.url, "connected to relay");
                    self.backoff.reset();
                    if let Err(e) = self.drive(stream, &mut on_event).await {
                        warn!("connection lost: {e}");
                    } else {
                        info!("connection closed by relay");
                    }
                }
                Err(e) => {
                    warn!(attempt = self.backoff.attempt() + 1, "connect failed: {e}");
                }
            }

            let delay = self.backoff.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
            tokio::time::sleep(delay).await;
        }
    }

    /// Drive one established connection until it ends.
    async fn drive<S, F>(
        &self,
        stream: tokio_tungstenite::WebSocketStream<S>,
        on_event: &mut F,
    ) -> Result<()>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
        F: FnMut(&ServerEvent) -> Option<ClientEvent>,
    {
        let (mut ws_sender, mut ws_receiver) = stream.split();

        // Register first; the relay ignores everything else until then.
        let register = ClientEvent::Register {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
        };
        ws_sender.send(encode(&register)?).await?;

        while let Some(frame) = ws_receiver.next().await {
            match frame? {
                WsMessage::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => {
                        if let Some(reply) = on_event(&event) {
                            ws_sender.send(encode(&reply)?).await?;
                        }
                    }
                    Err(e) => {
                        debug!("ignoring unrecognized server event: {e}");
                    }
                },
                WsMessage::Close(_) => break,
                // Pings are answered by tungstenite itself.
                _ => {}
            }
        }
        Ok(())
    }
}

fn encode(event: &ClientEvent) -> Result<WsMessage> {
    let json = serde_json::to_string(event).map_err(|e| RelayError::Transport(e.to_string()))?;
    Ok(WsMessage::Text(json.into()))
}
