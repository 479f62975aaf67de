//! Store error types.

use thiserror::Error;

/// Errors that can occur while mutating or persisting the document tree.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write the database file to disk.
    #[error("failed to persist store file: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to serialize the document tree.
    #[error("failed to serialize store: {0}")]
    Json(#[from] serde_json::Error),
    /// The operation requires at least one path segment.
    #[error("path has no segments")]
    EmptyPath,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
