//! Settings error types.

use thiserror::Error;

/// Errors that can occur when loading or saving settings and credentials.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read or write a configuration file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse or serialize configuration JSON.
    #[error("failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
