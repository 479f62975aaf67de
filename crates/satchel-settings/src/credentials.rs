//! Reading and writing the login credentials file.

use std::path::Path;

use crate::errors::Result;
use crate::types::Credentials;

/// Load credentials from `path`.
///
/// Returns `Ok(None)` if the file does not exist — the user has not logged
/// in. An unparsable file is an error (re-login fixes it).
pub fn load_credentials(path: &Path) -> Result<Option<Credentials>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Write credentials to `path`, creating the parent directory if needed.
pub fn save_credentials(path: &Path, credentials: &Credentials) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(credentials)?;
    std::fs::write(path, text)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
