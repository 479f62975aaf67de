//! The four built-in request handlers: GET, POST, PATCH, DELETE.

use serde_json::{Map, Value};

use satchel_core::{ApiRequest, ApiResponse, DocumentId};
use satchel_store::StorePath;

use crate::dispatch::context::AgentContext;
use crate::dispatch::registry::{DispatchError, MethodHandler, MethodRegistry};

/// Register all built-in handlers on `registry`.
pub fn register_all(registry: &mut MethodRegistry) {
    registry.register("GET", GetHandler);
    registry.register("POST", PostHandler);
    registry.register("PATCH", PatchHandler);
    registry.register("DELETE", DeleteHandler);
}

/// `GET path` — read the value at the path.
pub struct GetHandler;

impl MethodHandler for GetHandler {
    fn handle(
        &self,
        request: &ApiRequest,
        ctx: &AgentContext,
    ) -> Result<ApiResponse, DispatchError> {
        let path = StorePath::parse(&request.path);
        let store = ctx.store.lock();
        Ok(match store.get(&path) {
            Some(value) => ApiResponse::with_body(request.id.clone(), 200, value.clone()),
            None => ApiResponse::not_found(request.id.clone()),
        })
    }
}

/// `POST path` — create a document under a freshly minted id.
pub struct PostHandler;

impl MethodHandler for PostHandler {
    fn handle(
        &self,
        request: &ApiRequest,
        ctx: &AgentContext,
    ) -> Result<ApiResponse, DispatchError> {
        let id = DocumentId::new();

        // The stored document is the body's fields over {"id": ...}; a
        // non-object body contributes nothing beyond the id.
        let mut document = Map::new();
        let _ = document.insert("id".to_owned(), Value::String(id.to_string()));
        if let Some(Value::Object(fields)) = &request.body {
            for (key, value) in fields {
                let _ = document.insert(key.clone(), value.clone());
            }
        }
        let stored = Value::Object(document);

        let path = StorePath::parse(&request.path).child(id.as_str());
        ctx.store.lock().set(&path, stored.clone())?;
        Ok(ApiResponse::with_body(request.id.clone(), 201, stored))
    }
}

/// `PATCH path` — shallow-merge the body over an existing value.
pub struct PatchHandler;

impl MethodHandler for PatchHandler {
    fn handle(
        &self,
        request: &ApiRequest,
        ctx: &AgentContext,
    ) -> Result<ApiResponse, DispatchError> {
        let path = StorePath::parse(&request.path);
        let partial = request.body.clone().unwrap_or_else(|| Value::Object(Map::new()));
        let merged = ctx.store.lock().merge(&path, partial)?;
        Ok(match merged {
            Some(value) => ApiResponse::with_body(request.id.clone(), 200, value),
            None => ApiResponse::not_found(request.id.clone()),
        })
    }
}

/// `DELETE path` — remove the entry at the path.
pub struct DeleteHandler;

impl MethodHandler for DeleteHandler {
    fn handle(
        &self,
        request: &ApiRequest,
        ctx: &AgentContext,
    ) -> Result<ApiResponse, DispatchError> {
        let path = StorePath::parse(&request.path);
        let deleted = ctx.store.lock().delete(&path)?;
        Ok(if deleted {
            ApiResponse::with_body(
                request.id.clone(),
                200,
                serde_json::json!({ "success": true }),
            )
        } else {
            ApiResponse::not_found(request.id.clone())
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
