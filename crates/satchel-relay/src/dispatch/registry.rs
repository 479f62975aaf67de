//! Method registry and dispatch.
//!
//! One inbound request becomes exactly one response: unregistered verbs get
//! a 405, handler failures become a 500 carrying the failure's message, and
//! the correlation id is echoed on every path. Nothing escapes past
//! [`MethodRegistry::dispatch`].

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use satchel_core::{ApiRequest, ApiResponse};
use satchel_store::StoreError;

use crate::dispatch::context::AgentContext;

/// Failure inside a request handler, surfaced to the caller as a 500.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The store failed to read or persist.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Trait implemented by every request method handler.
pub trait MethodHandler: Send + Sync {
    /// Serve the request against the store, producing the full response.
    ///
    /// Not-found and similar outcomes are responses, not errors; `Err` is
    /// reserved for internal failures.
    fn handle(
        &self,
        request: &ApiRequest,
        ctx: &AgentContext,
    ) -> Result<ApiResponse, DispatchError>;
}

/// Registry mapping HTTP verbs to handlers.
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a method name.
    pub fn register(&mut self, method: &str, handler: impl MethodHandler + 'static) {
        let _ = self.handlers.insert(method.to_owned(), Arc::new(handler));
    }

    /// Dispatch a request to the appropriate handler.
    pub fn dispatch(&self, request: &ApiRequest, ctx: &AgentContext) -> ApiResponse {
        let Some(handler) = self.handlers.get(&request.method) else {
            debug!(method = %request.method, "unsupported method");
            return ApiResponse::method_not_allowed(request.id.clone());
        };

        match handler.handle(request, ctx) {
            Ok(response) => response,
            Err(err) => {
                error!(method = %request.method, path = %request.path, error = %err, "request handler failed");
                ApiResponse::internal_error(request.id.clone(), err.to_string())
            }
        }
    }

    /// List all registered method names (sorted).
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check whether a method is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
