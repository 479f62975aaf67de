//! Relay wire-format types.
//!
//! Every frame exchanged with the routing service is a JSON envelope
//! `{"event": <name>, "data": <payload>}`, modeled as adjacently tagged
//! enums: [`ServerEvent`] for inbound frames, [`ClientEvent`] for outbound.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::RequestId;

/// Frames received from the routing service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Identity handshake accepted.
    Authenticated {},
    /// Identity handshake rejected. Fatal for the agent process.
    AuthError {
        /// Router-supplied rejection reason.
        message: String,
    },
    /// A relayed request to serve against the local store.
    ApiRequest(ApiRequest),
    /// Request for a full dump of the document tree.
    #[serde(rename_all = "camelCase")]
    GetDataSnapshot {
        /// Correlation id to echo on the `data_snapshot` reply.
        request_id: RequestId,
    },
}

/// Frames sent to the routing service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Identity handshake, sent once per connection.
    #[serde(rename_all = "camelCase")]
    Authenticate {
        /// Local identity from the credentials file.
        username: String,
        /// Router-side user key. Same as the username for this agent.
        user_id: String,
    },
    /// Correlated reply to an `api_request`.
    ApiResponse(ApiResponse),
    /// Full store dump, correlated to a `get_data_snapshot`.
    #[serde(rename_all = "camelCase")]
    DataSnapshot {
        /// Echoed correlation id.
        request_id: RequestId,
        /// Deep copy of the document tree.
        snapshot: Value,
    },
    /// Liveness signal, sent on a fixed interval while connected.
    Heartbeat {},
}

/// An inbound relayed request: one HTTP-shaped call against the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    /// Correlation id, echoed unchanged on the response.
    pub id: RequestId,
    /// HTTP verb as sent by the remote caller. Unrecognized verbs get a 405.
    pub method: String,
    /// Slash-delimited store path.
    pub path: String,
    /// Optional JSON body (POST/PATCH).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// The correlated reply to an [`ApiRequest`].
///
/// Success and structured-error replies carry `body`; internal failures carry
/// the failure's message text in `error` instead.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Echoed correlation id.
    pub request_id: RequestId,
    /// HTTP-style status code.
    pub status_code: u16,
    /// Response payload (present on 2xx and structured 4xx replies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Failure message text (present on 500 replies only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Build a reply with a status code and body.
    pub fn with_body(request_id: RequestId, status_code: u16, body: Value) -> Self {
        Self {
            request_id,
            status_code,
            body: Some(body),
            error: None,
        }
    }

    /// Build the standard 404 reply.
    pub fn not_found(request_id: RequestId) -> Self {
        Self::with_body(request_id, 404, serde_json::json!({ "error": "Not found" }))
    }

    /// Build the standard 405 reply for an unsupported verb.
    pub fn method_not_allowed(request_id: RequestId) -> Self {
        Self::with_body(
            request_id,
            405,
            serde_json::json!({ "error": "Method not allowed" }),
        )
    }

    /// Build a 500 reply carrying the failure's message text.
    pub fn internal_error(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id,
            status_code: 500,
            body: None,
            error: Some(message.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
