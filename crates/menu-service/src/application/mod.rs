//! Application layer: what happens when a user types a menu command.
//!
//! # Sub-modules
//!
//! - **`commands`** – Turns a raw chat line into a [`commands::ChatCommand`].
//!   Recognizes the English command names and their Chinese aliases.
//!
//! - **`command_surface`** – Executes `help` and `help_admin` against the
//!   catalog store, the renderer and the installer, and sends the replies to
//!   a [`command_surface::ChatSink`].

pub mod command_surface;
pub mod commands;
