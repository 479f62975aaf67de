//! Dispatch dependency-injection context.

use parking_lot::Mutex;
use satchel_store::DocumentStore;

/// Shared context passed to every request handler and to the session.
///
/// The store sits behind a mutex purely so the context can be shared with
/// the event loop; the session processes one event at a time, so the lock
/// is never contended.
pub struct AgentContext {
    /// The local document store.
    pub store: Mutex<DocumentStore>,
    /// Identity this agent authenticates as.
    pub username: String,
}

impl AgentContext {
    /// Create a context around an opened store.
    pub fn new(store: DocumentStore, username: impl Into<String>) -> Self {
        Self {
            store: Mutex::new(store),
            username: username.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn context_exposes_store_and_identity() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AgentContext::new(
            DocumentStore::open(dir.path().join("database.json")),
            "alice",
        );
        assert_eq!(ctx.username, "alice");
        assert_eq!(ctx.store.lock().snapshot(), json!({}));
    }
}
