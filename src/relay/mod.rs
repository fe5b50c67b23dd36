//! Core relay components.
//!
//! This module contains the relay's state machine and routing logic:
//! - Connection registry (connection ↔ user mapping)
//! - Bounded message log for late-joiner replay
//! - Switchboard (per-connection outboxes and room membership)
//! - Router (fanout decisions for register/typing/send/disconnect)
//! - Wire protocol event types

pub mod fanout;
pub mod history;
pub mod message;
pub mod protocol;
pub mod registry;
pub mod router;

pub use fanout::{Switchboard, DEFAULT_OUTBOX_CAPACITY, GLOBAL_ROOM};
pub use history::{MessageLog, DEFAULT_MAX_RETAINED, REPLAY_LIMIT};
pub use message::{Destination, Message, PresenceEvent, PresenceKind};
pub use protocol::{ClientEvent, ServerEvent};
pub use registry::{ConnectionId, ConnectionRegistry, RegisteredUser};
pub use router::Router;
