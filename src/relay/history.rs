//! Bounded in-memory message log.
//!
//! Append-only sequence of chat messages used to replay recent history
//! to newly joined users. Total retention is hard-capped: once the cap
//! is reached the oldest entries are trimmed, so a long-running relay
//! holds a bounded amount of memory.

use std::collections::VecDeque;

use tokio::sync::RwLock;

use super::message::Message;

/// Number of messages replayed to a newly registered connection.
pub const REPLAY_LIMIT: usize = 80;

/// Default total retention (10x the replay window).
pub const DEFAULT_MAX_RETAINED: usize = REPLAY_LIMIT * 10;

/// Bounded, append-only message log.
pub struct MessageLog {
    messages: RwLock<VecDeque<Message>>,
    max_retained: usize,
}

impl MessageLog {
    /// Create a log with the default retention cap.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_RETAINED)
    }

    /// Create a log retaining at most `max_retained` messages.
    ///
    /// A zero cap is treated as a cap of one.
    pub fn with_capacity(max_retained: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::new()),
            max_retained: max_retained.max(1),
        }
    }

    /// Append a message, evicting the oldest entries past the cap.
    pub async fn append(&self, message: Message) {
        let mut messages = self.messages.write().await;
        messages.push_back(message);
        while messages.len() > self.max_retained {
            messages.pop_front();
        }
    }

    /// Snapshot of the last `limit` messages in insertion order.
    pub async fn recent(&self, limit: usize) -> Vec<Message> {
        let messages = self.messages.read().await;
        let skip = messages.len().saturating_sub(limit);
        messages.iter().skip(skip).cloned().collect()
    }

    /// Number of retained messages.
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
