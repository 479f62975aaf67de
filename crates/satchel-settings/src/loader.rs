//! Settings loading and `~/.satchel/` path resolution.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. If `~/.satchel/settings.json` exists, parse it (serde defaults fill
//!    any fields the file omits)
//! 3. Apply environment variable overrides (highest priority)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;
use crate::types::Settings;

/// Resolve the agent's home directory.
///
/// `$SATCHEL_HOME` wins when set; otherwise `$HOME/.satchel`.
pub fn satchel_home() -> PathBuf {
    if let Ok(dir) = std::env::var("SATCHEL_HOME") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".satchel")
}

/// Path to the settings file (`~/.satchel/settings.json`).
pub fn settings_path() -> PathBuf {
    satchel_home().join("settings.json")
}

/// Path to the credentials file (`~/.satchel/credentials.json`).
pub fn credentials_path() -> PathBuf {
    satchel_home().join("credentials.json")
}

/// Path to the document database (`~/.satchel/data/database.json`).
pub fn database_path() -> PathBuf {
    satchel_home().join("data").join("database.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<Settings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let mut settings = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        debug!(?path, "settings file not found, using defaults");
        Settings::default()
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(v) = read_env_string("SATCHEL_ROUTER_URL") {
        settings.router_url = v;
    }
    if let Some(v) = read_env_u64("SATCHEL_HEARTBEAT_INTERVAL_MS", 1000, 600_000) {
        settings.heartbeat_interval_ms = v;
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
