//! Event routing.
//!
//! The router is the decision layer between inbound client events and
//! outbound fanout: it consults the registry and history log, then
//! instructs the switchboard which connections receive what. It holds no
//! state of its own beyond handles to those components.
//!
//! Malformed or unauthorized events are dropped silently: a missing
//! register field, a send before registering, an empty message text and
//! a typing notice to an offline user all result in no outbound events
//! and no error to the caller.

use std::sync::Arc;

use tracing::{debug, info};

use super::fanout::{Switchboard, GLOBAL_ROOM};
use super::history::MessageLog;
use super::message::{Destination, Message, PresenceEvent};
use super::protocol::{ClientEvent, ServerEvent};
use super::registry::{ConnectionId, ConnectionRegistry};

/// Routes inbound events to destination connections.
pub struct Router {
    registry: Arc<ConnectionRegistry>,
    history: Arc<MessageLog>,
    switchboard: Arc<Switchboard>,
    replay_limit: usize,
}

impl Router {
    /// Create a router over shared relay state.
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        history: Arc<MessageLog>,
        switchboard: Arc<Switchboard>,
        replay_limit: usize,
    ) -> Self {
        Self {
            registry,
            history,
            switchboard,
            replay_limit,
        }
    }

    /// The shared connection registry.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// The shared switchboard.
    pub fn switchboard(&self) -> &Arc<Switchboard> {
        &self.switchboard
    }

    /// The shared message log.
    pub fn history(&self) -> &Arc<MessageLog> {
        &self.history
    }

    /// Dispatch one inbound client event.
    pub async fn handle_event(&self, conn_id: ConnectionId, event: ClientEvent) {
        match event {
            ClientEvent::Register { user_id, username } => {
                self.handle_register(conn_id, &user_id, &username).await;
            }
            ClientEvent::Typing { to_user_id, room } => {
                self.handle_typing(conn_id, to_user_id.as_deref(), room.as_deref())
                    .await;
            }
            ClientEvent::SendMessage { text, to_user_id, room } => {
                self.handle_send(conn_id, &text, to_user_id, room).await;
            }
        }
    }

    /// Register a connection as a user.
    ///
    /// On success the connection joins the global room, receives the
    /// recent history, and a join presence event goes out to every live
    /// connection. Invalid input emits nothing.
    pub async fn handle_register(&self, conn_id: ConnectionId, user_id: &str, username: &str) {
        if !self.registry.register(conn_id, user_id, username).await {
            debug!(%conn_id, "ignoring register with missing userId or username");
            return;
        }

        self.switchboard.join(GLOBAL_ROOM, conn_id).await;

        let messages = self.history.recent(self.replay_limit).await;
        self.switchboard
            .send_to(conn_id, ServerEvent::History { messages })
            .await;

        self.switchboard
            .broadcast_all(&ServerEvent::Presence(PresenceEvent::join(user_id, username)))
            .await;

        info!(%conn_id, user_id, username, "registered");
    }

    /// Relay a typing notice.
    ///
    /// Requires a registered sender. A DM notice to an offline user is
    /// dropped, not queued.
    pub async fn handle_typing(
        &self,
        conn_id: ConnectionId,
        to_user_id: Option<&str>,
        room: Option<&str>,
    ) {
        let Some(sender) = self.registry.lookup_by_connection(conn_id).await else {
            return;
        };
        let notice = ServerEvent::Typing { from_user_id: sender.user_id };

        match to_user_id {
            Some(target) => {
                if let Some(target_conn) = self.registry.lookup_by_user(target).await {
                    self.switchboard.send_to(target_conn, notice).await;
                }
            }
            None => {
                self.switchboard
                    .broadcast(room.unwrap_or(GLOBAL_ROOM), &notice)
                    .await;
            }
        }
    }

    /// Create and route a chat message.
    ///
    /// Requires a registered sender and non-empty text. The message is
    /// appended to the log unconditionally, DMs included. A DM is
    /// delivered to the target if one is connected, always echoed back
    /// to the sender and acknowledged to the sender; a room message is
    /// fanned out to the room's current members, sender included.
    pub async fn handle_send(
        &self,
        conn_id: ConnectionId,
        text: &str,
        to_user_id: Option<String>,
        room: Option<String>,
    ) {
        let Some(sender) = self.registry.lookup_by_connection(conn_id).await else {
            return;
        };
        if text.is_empty() {
            return;
        }

        let message = match to_user_id {
            Some(target) => Message::direct(sender.user_id, target, text),
            None => Message::room(
                sender.user_id,
                room.unwrap_or_else(|| GLOBAL_ROOM.to_string()),
                text,
            ),
        };
        self.history.append(message.clone()).await;

        let event = ServerEvent::Message(message.clone());
        match &message.destination {
            Destination::Direct { to_user_id } => {
                if let Some(target_conn) = self.registry.lookup_by_user(to_user_id).await {
                    self.switchboard.send_to(target_conn, event.clone()).await;
                }
                self.switchboard.send_to(conn_id, event).await;
                self.switchboard
                    .send_to(conn_id, ServerEvent::MessageAck { id: message.id.clone() })
                    .await;
            }
            Destination::Room { room } => {
                self.switchboard.broadcast(room, &event).await;
            }
        }
    }

    /// Clean up a closed connection.
    ///
    /// Detaches the connection from the switchboard and, if it had
    /// registered, broadcasts a leave presence event to every remaining
    /// connection. Safe to call for never-registered connections.
    pub async fn handle_disconnect(&self, conn_id: ConnectionId) {
        self.switchboard.detach(conn_id).await;
        if let Some(user) = self.registry.remove(conn_id).await {
            info!(%conn_id, user_id = %user.user_id, "disconnected");
            self.switchboard
                .broadcast_all(&ServerEvent::Presence(PresenceEvent::leave(
                    user.user_id,
                    user.username,
                )))
                .await;
        } else {
            debug!(%conn_id, "unregistered connection closed");
        }
    }
}
