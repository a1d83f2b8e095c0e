//! Domain types for Command Menu.
//!
//! This module contains pure data types with no infrastructure dependencies.
//!
//! - [`catalog`] – The operator-curated category document and the derived
//!   plugin → commands map.
//! - [`registry`] – The read-only view of the host framework's plugin
//!   registry.  The host (or a stand-in such as a snapshot file) implements
//!   [`registry::PluginRegistry`]; the core only ever reads through it.

pub mod catalog;
pub mod registry;
