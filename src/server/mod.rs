//! WebSocket relay server.
//!
//! Wires transport connections to the router: accepts connections,
//! dispatches inbound events and owns each session's lifecycle.

pub mod cors;
pub mod listener;
pub mod session;

pub use listener::{RelayServer, RelayState};
pub use session::relay_ws_handler;
