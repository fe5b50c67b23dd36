//! Switchboard: per-connection outboxes and room membership.
//!
//! This is the transport's broadcast-group primitive. Every attached
//! connection owns a bounded mpsc outbox drained by its session task;
//! delivery uses `try_send`, so a slow or dead peer loses events instead
//! of stalling the router.

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use super::protocol::ServerEvent;
use super::registry::ConnectionId;

/// The default, always-joined broadcast room.
pub const GLOBAL_ROOM: &str = "global";

/// Default capacity of a connection's outbound queue.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

#[derive(Default)]
struct SwitchboardInner {
    outboxes: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
    rooms: HashMap<String, HashSet<ConnectionId>>,
}

/// Owns outbound routing for all live connections.
#[derive(Default)]
pub struct Switchboard {
    inner: RwLock<SwitchboardInner>,
}

impl Switchboard {
    /// Create an empty switchboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection's outbox. Called once per connection accept.
    pub async fn attach(&self, conn_id: ConnectionId, outbox: mpsc::Sender<ServerEvent>) {
        self.inner.write().await.outboxes.insert(conn_id, outbox);
    }

    /// Detach a connection: drop its outbox and leave every room.
    pub async fn detach(&self, conn_id: ConnectionId) {
        let mut inner = self.inner.write().await;
        inner.outboxes.remove(&conn_id);
        inner.rooms.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });
    }

    /// Add a connection to a room's broadcast group.
    pub async fn join(&self, room: impl Into<String>, conn_id: ConnectionId) {
        self.inner
            .write()
            .await
            .rooms
            .entry(room.into())
            .or_default()
            .insert(conn_id);
    }

    /// Whether a connection is a member of a room.
    pub async fn is_member(&self, room: &str, conn_id: ConnectionId) -> bool {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .is_some_and(|members| members.contains(&conn_id))
    }

    /// Number of attached connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.outboxes.len()
    }

    /// Deliver an event to one connection.
    ///
    /// Returns whether the event was queued. Best-effort: a full or
    /// closed outbox drops the event.
    pub async fn send_to(&self, conn_id: ConnectionId, event: ServerEvent) -> bool {
        let inner = self.inner.read().await;
        let Some(outbox) = inner.outboxes.get(&conn_id) else {
            return false;
        };
        match outbox.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!(%conn_id, "dropping outbound event: {e}");
                false
            }
        }
    }

    /// Deliver an event to every member of a room.
    pub async fn broadcast(&self, room: &str, event: &ServerEvent) {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room) else {
            return;
        };
        for conn_id in members {
            if let Some(outbox) = inner.outboxes.get(conn_id) {
                if let Err(e) = outbox.try_send(event.clone()) {
                    debug!(conn_id = %conn_id, room, "dropping broadcast event: {e}");
                }
            }
        }
    }

    /// Deliver an event to every attached connection, registered or not.
    pub async fn broadcast_all(&self, event: &ServerEvent) {
        let inner = self.inner.read().await;
        for (conn_id, outbox) in &inner.outboxes {
            if let Err(e) = outbox.try_send(event.clone()) {
                debug!(conn_id = %conn_id, "dropping broadcast event: {e}");
            }
        }
    }
}
