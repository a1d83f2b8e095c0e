//! menu-service library crate.
//!
//! This crate wires the pure catalog logic from `menu-core` to the outside
//! world: the JSON catalog file, a headless browser, the web editor and the
//! chat command surface.
//!
//! # Architecture
//!
//! ```text
//! chat line ──► application::commands ──► application::command_surface
//!                                              │           │
//!                                              ▼           ▼
//!                          infrastructure::storage   infrastructure::render
//!                                 ▲                         │
//!                                 │                         ▼
//! browser ──► infrastructure::web_server          PNG in <data_dir>/temp
//!                      │                                    │
//!                      ▼                                    ▼
//!               menu_core::extract            infrastructure::cleanup
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `menu-core` and on the infrastructure types it
//!   is handed at construction time; it never opens files or sockets itself.
//! - `infrastructure` holds every adapter that performs I/O.

/// Application layer: chat command parsing and the command surface.
pub mod application;

/// Infrastructure layer: storage, rendering, HTTP, registry and console adapters.
pub mod infrastructure;
