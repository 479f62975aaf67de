//! # satchel-core
//!
//! Shared types for the satchel agent: the relay wire protocol (event
//! envelopes, API requests/responses) and branded ID newtypes.

#![deny(unsafe_code)]

pub mod ids;
pub mod protocol;

pub use ids::{DocumentId, RequestId};
pub use protocol::{ApiRequest, ApiResponse, ClientEvent, ServerEvent};
