//! Settings and credentials types.

use serde::{Deserialize, Serialize};

/// Default routing service URL.
pub const DEFAULT_ROUTER_URL: &str = "ws://localhost:3001/ws";
/// Default heartbeat interval in milliseconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Agent settings, loaded from `settings.json` with env overrides.
///
/// Every field has a serde default, so a partial (or absent) settings file
/// parses directly — unset fields fall back to the compiled defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// WebSocket URL of the routing service.
    pub router_url: String,
    /// Interval between outbound heartbeat frames, in milliseconds.
    pub heartbeat_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            router_url: DEFAULT_ROUTER_URL.to_owned(),
            heartbeat_interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
        }
    }
}

/// Login state written by `satchel login`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    /// Identity presented to the routing service.
    pub username: String,
    /// RFC 3339 timestamp of when the login was recorded.
    pub timestamp: String,
}

impl Credentials {
    /// Create credentials for `username`, stamped with the current UTC time.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
