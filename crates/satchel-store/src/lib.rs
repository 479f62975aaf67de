//! # satchel-store
//!
//! The path-addressed document store: an in-memory JSON tree, durably
//! persisted to a single pretty-printed file after every mutation.
//!
//! Paths are `/`-delimited sequences of non-empty key segments. Reads that
//! miss return `None` rather than an error; the only store errors are
//! persistence failures and structurally invalid calls (an empty path where
//! a final segment is required).

#![deny(unsafe_code)]

pub mod errors;
pub mod path;
pub mod store;

pub use errors::{Result, StoreError};
pub use path::StorePath;
pub use store::{DocumentStore, shallow_merge};
