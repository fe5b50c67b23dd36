//! Connection registry for the relay.
//!
//! Keeps the two views of the connection ↔ user relation in lock-step
//! behind a single lock: `userId → connectionId` for routing DMs and
//! `connectionId → {userId, username}` for attributing inbound events.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::RwLock;
use uuid::Uuid;

/// Opaque identity for one live transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Issue a fresh connection id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user a connection registered as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    /// Logical identity supplied at registration.
    pub user_id: String,
    /// Display name supplied alongside it.
    pub username: String,
}

#[derive(Default)]
struct RegistryInner {
    users_by_conn: HashMap<ConnectionId, RegisteredUser>,
    conns_by_user: HashMap<String, ConnectionId>,
}

/// Bidirectional mapping between connections and logical users.
///
/// Shared across all sessions; both directions are mutated under one
/// write lock so they can never diverge.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection as a user.
    ///
    /// A later registration for the same userId silently replaces the
    /// mapping, orphaning the previous connection's DM routing. Empty
    /// `user_id` or `username` is ignored (no-op); returns whether the
    /// registration was accepted.
    pub async fn register(
        &self,
        conn_id: ConnectionId,
        user_id: impl Into<String>,
        username: impl Into<String>,
    ) -> bool {
        let user_id = user_id.into();
        let username = username.into();
        if user_id.is_empty() || username.is_empty() {
            return false;
        }

        let mut inner = self.inner.write().await;
        inner
            .users_by_conn
            .insert(conn_id, RegisteredUser { user_id: user_id.clone(), username });
        inner.conns_by_user.insert(user_id, conn_id);
        true
    }

    /// Look up the live connection for a user.
    pub async fn lookup_by_user(&self, user_id: &str) -> Option<ConnectionId> {
        self.inner.read().await.conns_by_user.get(user_id).copied()
    }

    /// Look up who a connection registered as.
    pub async fn lookup_by_connection(&self, conn_id: ConnectionId) -> Option<RegisteredUser> {
        self.inner.read().await.users_by_conn.get(&conn_id).cloned()
    }

    /// Remove a connection on disconnect.
    ///
    /// Removes both directions via the reverse lookup and returns the
    /// removed user so the caller can emit an accurate leave presence
    /// event. No-op if the connection never registered. The user-side
    /// mapping is only dropped if it still points at this connection,
    /// so a later registration of the same userId is not evicted.
    pub async fn remove(&self, conn_id: ConnectionId) -> Option<RegisteredUser> {
        let mut inner = self.inner.write().await;
        let user = inner.users_by_conn.remove(&conn_id)?;
        if inner.conns_by_user.get(&user.user_id) == Some(&conn_id) {
            inner.conns_by_user.remove(&user.user_id);
        }
        Some(user)
    }

    /// Number of registered connections.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users_by_conn.len()
    }

    /// Whether no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.users_by_conn.is_empty()
    }
}
