//! Chat message and presence types for the relay.
//!
//! Messages are immutable once created: the router constructs one per
//! accepted `send_message` event, appends it to the history log and fans
//! it out. Presence events are ephemeral and never stored.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where a message is delivered: a named room or a single user.
///
/// Exactly one of the two wire fields (`room` / `toUserId`) is present,
/// which the untagged representation enforces by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destination {
    /// Direct message to one logical user.
    #[serde(rename_all = "camelCase")]
    Direct {
        /// Target user's logical identity.
        to_user_id: String,
    },
    /// Broadcast to a named room.
    Room {
        /// Room name.
        room: String,
    },
}

impl Destination {
    /// Target userId if this is a direct message.
    pub fn to_user_id(&self) -> Option<&str> {
        match self {
            Destination::Direct { to_user_id } => Some(to_user_id),
            Destination::Room { .. } => None,
        }
    }

    /// Room name if this is a room broadcast.
    pub fn room(&self) -> Option<&str> {
        match self {
            Destination::Direct { .. } => None,
            Destination::Room { room } => Some(room),
        }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique id (millisecond timestamp + random suffix).
    pub id: String,
    /// Sender's logical identity.
    pub from_user_id: String,
    /// Room or DM target.
    #[serde(flatten)]
    pub destination: Destination,
    /// User content, opaque to the relay.
    pub text: String,
    /// Creation time, assigned once.
    pub ts: DateTime<Utc>,
}

impl Message {
    /// Create a room message.
    pub fn room(
        from_user_id: impl Into<String>,
        room: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            from_user_id: from_user_id.into(),
            destination: Destination::Room { room: room.into() },
            text: text.into(),
            ts: Utc::now(),
        }
    }

    /// Create a direct message.
    pub fn direct(
        from_user_id: impl Into<String>,
        to_user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            from_user_id: from_user_id.into(),
            destination: Destination::Direct {
                to_user_id: to_user_id.into(),
            },
            text: text.into(),
            ts: Utc::now(),
        }
    }
}

/// Generate a message id.
///
/// Ids only need practical uniqueness (client-side dedup and ack
/// display), not collision-free ordering.
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..0x100_0000);
    format!("{millis}-{suffix:06x}")
}

/// Kind of presence change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceKind {
    /// User registered.
    Join,
    /// User's connection dropped.
    Leave,
}

impl PresenceKind {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceKind::Join => "join",
            PresenceKind::Leave => "leave",
        }
    }
}

/// Ephemeral join/leave notification, broadcast to all live connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEvent {
    /// Join or leave.
    #[serde(rename = "type")]
    pub kind: PresenceKind,
    /// Logical identity of the user.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// When the change happened.
    pub at: DateTime<Utc>,
}

impl PresenceEvent {
    /// Create a join notification.
    pub fn join(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            kind: PresenceKind::Join,
            user_id: user_id.into(),
            username: username.into(),
            at: Utc::now(),
        }
    }

    /// Create a leave notification.
    pub fn leave(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            kind: PresenceKind::Leave,
            user_id: user_id.into(),
            username: username.into(),
            at: Utc::now(),
        }
    }
}
