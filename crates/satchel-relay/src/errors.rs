//! Relay error types.

use thiserror::Error;

/// Errors raised by the relay session.
///
/// Only [`RelayError::AuthRejected`] is fatal to the process; transport
/// failures feed the reconnect loop instead.
#[derive(Debug, Error)]
pub enum RelayError {
    /// WebSocket connect/read/write failure.
    #[error("transport failure: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    /// The routing service rejected our identity. Fatal, no retry.
    #[error("authentication rejected: {message}")]
    AuthRejected {
        /// Router-supplied rejection reason.
        message: String,
    },
    /// Failed to encode an outbound frame.
    #[error("failed to encode outbound frame: {0}")]
    Encode(#[from] serde_json::Error),
}
