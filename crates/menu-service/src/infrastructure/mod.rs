//! Infrastructure layer for menu-service.
//!
//! Every adapter that performs I/O lives here:
//!
//! - [`storage`]            – the JSON catalog document and the TOML settings file
//! - [`render`]             – headless-browser rendering and browser installation
//! - [`cleanup`]            – delayed deletion of rendered images
//! - [`web_server`]         – the web editor's HTTP routes
//! - [`registry_snapshot`]  – a file-backed stand-in for the host plugin registry
//! - [`console`]            – a stdin/stdout stand-in for the host chat sink
//!
//! **Dependency rule**: this layer may depend on `menu-core`, but the
//! `application` layer only sees the types re-exported from here, never the
//! browser or HTTP crates directly.

pub mod cleanup;
pub mod console;
pub mod registry_snapshot;
pub mod render;
pub mod storage;
pub mod web_server;
