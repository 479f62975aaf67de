//! The document store: a JSON tree addressed by [`StorePath`], written back
//! to its backing file after every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::{Result, StoreError};
use crate::path::StorePath;

/// Path-addressed JSON document store.
///
/// The whole tree lives in memory; every mutating call rewrites the backing
/// file synchronously (whole-file overwrite, pretty-printed). The root is
/// always a JSON object.
pub struct DocumentStore {
    file_path: PathBuf,
    root: Value,
}

impl DocumentStore {
    /// Open a store backed by `file_path`.
    ///
    /// A missing, unreadable, or unparsable file yields an empty tree —
    /// corruption is logged and swallowed, never surfaced.
    pub fn open(file_path: impl Into<PathBuf>) -> Self {
        let file_path = file_path.into();
        let root = load_or_empty(&file_path);
        Self { file_path, root }
    }

    /// Read the value at `path`.
    ///
    /// Returns `None` if any segment is missing at any depth; descending
    /// into a non-mapping node counts as missing. The root path returns the
    /// whole tree.
    pub fn get(&self, path: &StorePath) -> Option<&Value> {
        let mut cursor = &self.root;
        for segment in path.segments() {
            cursor = cursor.as_object()?.get(segment.as_str())?;
        }
        Some(cursor)
    }

    /// Write `value` at `path`, creating intermediate mappings as needed,
    /// then persist.
    ///
    /// Policy: a non-mapping value found at an intermediate segment is
    /// overwritten with a new empty mapping, discarding the old value.
    pub fn set(&mut self, path: &StorePath, value: Value) -> Result<()> {
        let (parents, last) = path.split_last().ok_or(StoreError::EmptyPath)?;

        let mut cursor = &mut self.root;
        for segment in parents {
            cursor = as_map_coercing(cursor)
                .entry(segment.as_str())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        let _ = as_map_coercing(cursor).insert(last.to_owned(), value);

        self.persist()
    }

    /// Shallow-merge `partial` over the value at `path` and persist.
    ///
    /// Returns `Ok(None)` without mutating when nothing exists at `path`;
    /// otherwise returns the merged value that was written.
    pub fn merge(&mut self, path: &StorePath, partial: Value) -> Result<Option<Value>> {
        let Some(existing) = self.get(path) else {
            return Ok(None);
        };
        let merged = shallow_merge(existing.clone(), partial);
        self.set(path, merged.clone())?;
        Ok(Some(merged))
    }

    /// Remove the entry at `path` and persist.
    ///
    /// Returns `Ok(false)` without mutating when any ancestor segment is
    /// missing or the final entry does not exist.
    pub fn delete(&mut self, path: &StorePath) -> Result<bool> {
        let (parents, last) = path.split_last().ok_or(StoreError::EmptyPath)?;

        let mut cursor = &mut self.root;
        for segment in parents {
            cursor = match cursor {
                Value::Object(map) => match map.get_mut(segment.as_str()) {
                    Some(next) => next,
                    None => return Ok(false),
                },
                _ => return Ok(false),
            };
        }

        let removed = match cursor {
            Value::Object(map) => map.remove(last).is_some(),
            _ => false,
        };
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// A deep copy of the entire tree, for transmission.
    pub fn snapshot(&self) -> Value {
        self.root.clone()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.root)?;
        fs::write(&self.file_path, text)?;
        Ok(())
    }
}

/// Shallow, right-biased merge: when both sides are objects, `patch`'s keys
/// win over `base`'s; in every other case `patch` replaces `base` entirely.
pub fn shallow_merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                let _ = base_map.insert(key, value);
            }
            Value::Object(base_map)
        }
        (_, patch) => patch,
    }
}

/// View `node` as a mutable map, replacing any non-mapping value with an
/// empty one first (the coercion policy of [`DocumentStore::set`]).
fn as_map_coercing(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just coerced to an object"),
    }
}

fn load_or_empty(path: &Path) -> Value {
    let empty = || Value::Object(Map::new());
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "database file not found, starting empty");
            return empty();
        }
        Err(error) => {
            warn!(?path, %error, "database file unreadable, starting empty");
            return empty();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(root @ Value::Object(_)) => root,
        Ok(_) => {
            warn!(?path, "database file root is not an object, starting empty");
            empty()
        }
        Err(error) => {
            warn!(?path, %error, "database file unparsable, starting empty");
            empty()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
