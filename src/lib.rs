//! Partyline - A real-time chat relay.
//!
//! A single-process, memory-resident relay: clients connect over
//! WebSocket, register a logical identity, and exchange room messages,
//! DMs, typing notices and presence events. All state is lost on
//! restart.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod relay;
pub mod server;

pub use client::{Backoff, RelayClient};
pub use config::Config;
pub use error::{RelayError, Result};
pub use relay::{
    ClientEvent, ConnectionId, ConnectionRegistry, Destination, Message, MessageLog,
    PresenceEvent, PresenceKind, RegisteredUser, Router, ServerEvent, Switchboard, GLOBAL_ROOM,
    REPLAY_LIMIT,
};
pub use server::{RelayServer, RelayState};
