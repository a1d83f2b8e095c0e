//! Storage infrastructure: catalog document and service settings.
//!
//! - [`catalog_store`] owns the operator-edited `custom_commands.json`.  It
//!   is read by the chat commands and written by the web editor.
//! - [`settings`] reads the optional TOML settings file that configures
//!   ports, paths, render sizes and installer commands.

pub mod catalog_store;
pub mod settings;

pub use catalog_store::{CatalogStore, StoreError, CATALOG_FILE_NAME};
pub use settings::{load_settings, ServiceSettings, SettingsError};
