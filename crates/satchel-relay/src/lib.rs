//! # satchel-relay
//!
//! The agent's relay plumbing: a WebSocket session to the routing service
//! (handshake, heartbeat, reconnect) and the dispatcher that serves relayed
//! API requests against the local document store.

#![deny(unsafe_code)]

pub mod backoff;
pub mod dispatch;
pub mod errors;
pub mod session;

pub use dispatch::context::AgentContext;
pub use dispatch::registry::{MethodHandler, MethodRegistry};
pub use errors::RelayError;
pub use session::{RelaySession, SessionConfig};
