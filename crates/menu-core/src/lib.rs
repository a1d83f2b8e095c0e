//! # menu-core
//!
//! Shared library for Command Menu containing the catalog data model, the
//! read-only host registry contract, the command extractor and the catalog
//! formatter.
//!
//! This crate has zero dependencies on file systems, sockets, browsers or
//! the host chat framework.  Everything that touches the outside world lives
//! in `menu-service`.
//!
//! # Architecture overview
//!
//! Command Menu lets an operator arrange the commands offered by a chat bot's
//! plugins into named categories, then shows that arrangement to chat users
//! as an image (or as plain text when no browser is available).
//!
//! - **`domain`** – The types everything else talks about: the persisted
//!   [`CategoryConfig`] document and the [`PluginRegistry`] contract through
//!   which the host exposes its plugins and handlers.
//!
//! - **`extract`** – Walks the registry and builds a [`PluginCommandMap`]
//!   (plugin name → `"name#description"` strings) for the web editor.
//!
//! - **`format`** – Turns a category list into an HTML page for the renderer,
//!   a static cover page, or a plain-text fallback.

pub mod domain;
pub mod extract;
pub mod format;

// Re-export the most-used types at the crate root so callers can write
// `menu_core::Category` instead of `menu_core::domain::catalog::Category`.
pub use domain::catalog::{Category, CategoryConfig, CommandEntry, PluginCommandMap};
pub use domain::registry::{HandlerFilter, HandlerInfo, PluginInfo, PluginRegistry, RegistryError};
pub use extract::extract_commands;
pub use format::{
    catalog_stats, format_catalog_html, format_catalog_text, format_cover_html,
    MISSING_DESCRIPTION,
};
