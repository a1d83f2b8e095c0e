//! The category catalog document and the derived plugin command map.
//!
//! [`CategoryConfig`] is the single JSON document persisted on disk:
//!
//! ```json
//! {
//!   "enabled": true,
//!   "categories": [
//!     { "name": "Games", "commands": [ { "name": "dice", "desc": "Roll a die" } ] }
//!   ]
//! }
//! ```
//!
//! Fields annotated with `#[serde(default)]` fall back to their defaults when
//! absent, so a document written by an older editor (or by hand) still loads.
//! The web editor always replaces the whole `categories` array; entries have
//! no identity beyond their position.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Root of the persisted catalog document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Whether the help command answers at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Operator-defined categories, in display order.
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// A named group of commands shown together in the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Display name.  Not required to be unique.
    #[serde(default)]
    pub name: String,
    /// Commands in display order.
    #[serde(default)]
    pub commands: Vec<CommandEntry>,
}

/// One command row inside a [`Category`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandEntry {
    /// Command name without the leading slash.
    #[serde(default)]
    pub name: String,
    /// Human-readable description; empty when the operator left it blank.
    #[serde(default)]
    pub desc: String,
}

fn default_true() -> bool {
    true
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            categories: Vec::new(),
        }
    }
}

impl Category {
    /// Creates a category with the given name and commands.
    pub fn new(name: impl Into<String>, commands: Vec<CommandEntry>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }
}

impl CommandEntry {
    /// Creates a command entry.  Pass an empty `desc` for "no description".
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
        }
    }
}

// ── PluginCommandMap ──────────────────────────────────────────────────────────

/// Plugin display name → formatted command strings, in first-seen order.
///
/// Built fresh from the host registry on every request and never persisted.
/// Serializes as a JSON object whose keys keep insertion order, which is the
/// order the registry reported the plugins in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginCommandMap {
    entries: Vec<(String, Vec<String>)>,
}

impl PluginCommandMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `command` to `plugin`'s list unless it is already present.
    ///
    /// Returns `true` if the command was added.
    pub fn insert_unique(&mut self, plugin: &str, command: String) -> bool {
        let commands = match self.entries.iter().position(|(name, _)| name == plugin) {
            Some(idx) => &mut self.entries[idx].1,
            None => {
                self.entries.push((plugin.to_string(), Vec::new()));
                let last = self.entries.len() - 1;
                &mut self.entries[last].1
            }
        };

        if commands.contains(&command) {
            return false;
        }
        commands.push(command);
        true
    }

    /// Returns the commands listed for `plugin`, if any.
    pub fn get(&self, plugin: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == plugin)
            .map(|(_, commands)| commands.as_slice())
    }

    /// Iterates over `(plugin, commands)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, commands)| (name.as_str(), commands.as_slice()))
    }

    /// Iterates over plugin names in insertion order.
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of plugins in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no plugin contributed a command.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of command strings across all plugins.
    pub fn total_commands(&self) -> usize {
        self.entries.iter().map(|(_, commands)| commands.len()).sum()
    }
}

impl Serialize for PluginCommandMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (plugin, commands) in &self.entries {
            map.serialize_entry(plugin, commands)?;
        }
        map.end()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
