//! # satchel-settings
//!
//! File-backed configuration for the agent: the `~/.satchel/` directory
//! layout, optional `settings.json` with environment overrides, and the
//! `credentials.json` written at login.

#![deny(unsafe_code)]

pub mod credentials;
pub mod errors;
pub mod loader;
pub mod types;

pub use credentials::{load_credentials, save_credentials};
pub use errors::{Result, SettingsError};
pub use loader::{credentials_path, database_path, load_settings, satchel_home, settings_path};
pub use types::{Credentials, Settings};
