//! Read-only contract over the host framework's plugin registry.
//!
//! The host keeps its own plugin and handler records; Command Menu never
//! inspects them directly.  Instead the host (or a stand-in) implements
//! [`PluginRegistry`] and hands out flattened [`PluginInfo`] / [`HandlerInfo`]
//! records whose filters have already been resolved into [`HandlerFilter`]
//! variants.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for registry queries.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The host registry could not be reached or read.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The registry answered with data that could not be interpreted.
    #[error("malformed registry data: {0}")]
    Malformed(String),
}

/// An activated plugin as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginInfo {
    /// Display name, also used as the key in the command map.
    pub name: String,
    /// Module path that owns the plugin's handlers.
    pub module_path: String,
}

/// One filter attached to a handler.
///
/// Only command and command-group filters carry a name a user can type; all
/// other host filter kinds (permissions, message types, regexes, …) collapse
/// into [`HandlerFilter::Other`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandlerFilter {
    /// A plain command such as `/weather`.
    Command { name: String },
    /// A command group such as `/admin <sub>`.
    CommandGroup { name: String },
    /// Any filter without a command name.
    #[serde(other)]
    Other,
}

/// A registered event handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandlerInfo {
    /// Module path of the plugin that registered the handler.
    pub module_path: String,
    /// Handler description (docstring in most hosts).
    #[serde(default)]
    pub description: Option<String>,
    /// Filters in registration order.
    #[serde(default)]
    pub filters: Vec<HandlerFilter>,
}

impl HandlerInfo {
    /// Resolves the name a user types to trigger this handler.
    ///
    /// The first command or command-group filter wins; handlers with neither,
    /// or whose first such filter has an empty name, return `None`.
    pub fn command_name(&self) -> Option<&str> {
        self.filters
            .iter()
            .find_map(|filter| match filter {
                HandlerFilter::Command { name } | HandlerFilter::CommandGroup { name } => {
                    Some(name.as_str())
                }
                HandlerFilter::Other => None,
            })
            .filter(|name| !name.is_empty())
    }

    /// Formats the handler as `"name#description"`, or `"name"` when there is
    /// no description.  Returns `None` when no command name resolves.
    pub fn formatted_command(&self) -> Option<String> {
        let name = self.command_name()?;
        match self.description.as_deref() {
            Some(desc) if !desc.is_empty() => Some(format!("{name}#{desc}")),
            _ => Some(name.to_string()),
        }
    }
}

/// Read-only access to the host's plugin registry.
///
/// Both queries are suspension points: a real host binding may have to
/// cross a process or FFI boundary to answer them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PluginRegistry: Send + Sync {
    /// Lists the plugins that are currently activated.
    async fn list_active_plugins(&self) -> Result<Vec<PluginInfo>, RegistryError>;

    /// Lists the handlers registered under `module_path`.
    async fn list_handlers_for_module(
        &self,
        module_path: &str,
    ) -> Result<Vec<HandlerInfo>, RegistryError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
