//! File-backed [`PluginRegistry`] for running without a host framework.
//!
//! A host binding would answer registry queries from its own plugin tables.
//! When the service runs standalone, the same information comes from a JSON
//! snapshot the host (or an operator) exports:
//!
//! ```json
//! {
//!   "plugins":  [{ "name": "Weather", "module_path": "plugins.weather", "activated": true }],
//!   "handlers": [{ "module_path": "plugins.weather", "description": "Show the forecast",
//!                  "filters": [{ "type": "command", "name": "weather" }] }]
//! }
//! ```
//!
//! The file is re-read on every query, so edits show up in the web editor's
//! plugin list without a restart.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use menu_core::{HandlerInfo, PluginInfo, PluginRegistry, RegistryError};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Error type for reading a registry snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("I/O error reading registry snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid snapshot JSON.
    #[error("failed to parse registry snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<SnapshotError> for RegistryError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::Io { .. } => RegistryError::Unavailable(e.to_string()),
            SnapshotError::Parse(_) => RegistryError::Malformed(e.to_string()),
        }
    }
}

/// One plugin record in the snapshot.
#[derive(Debug, Clone, Deserialize)]
struct SnapshotPlugin {
    #[serde(default)]
    name: String,
    #[serde(default)]
    module_path: String,
    #[serde(default = "default_activated")]
    activated: bool,
}

fn default_activated() -> bool {
    true
}

/// The whole snapshot document.
#[derive(Debug, Clone, Default, Deserialize)]
struct RegistrySnapshot {
    #[serde(default)]
    plugins: Vec<SnapshotPlugin>,
    #[serde(default)]
    handlers: Vec<HandlerInfo>,
}

/// [`PluginRegistry`] answered from a JSON snapshot file.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRegistry {
    path: Option<PathBuf>,
}

impl SnapshotRegistry {
    /// Reads from `path` on every query.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A registry with no plugins at all.
    pub fn empty() -> Self {
        Self { path: None }
    }

    /// Path of the snapshot file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn read_snapshot(&self) -> Result<RegistrySnapshot, SnapshotError> {
        let Some(path) = &self.path else {
            return Ok(RegistrySnapshot::default());
        };
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: path.clone(),
                source,
            })?;
        let snapshot: RegistrySnapshot = serde_json::from_str(&content)?;
        debug!(
            "registry snapshot: {} plugins, {} handlers",
            snapshot.plugins.len(),
            snapshot.handlers.len()
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl PluginRegistry for SnapshotRegistry {
    async fn list_active_plugins(&self) -> Result<Vec<PluginInfo>, RegistryError> {
        let snapshot = self.read_snapshot().await?;
        Ok(snapshot
            .plugins
            .into_iter()
            .filter(|p| p.activated)
            .map(|p| PluginInfo {
                name: p.name,
                module_path: p.module_path,
            })
            .collect())
    }

    async fn list_handlers_for_module(
        &self,
        module_path: &str,
    ) -> Result<Vec<HandlerInfo>, RegistryError> {
        let snapshot = self.read_snapshot().await?;
        Ok(snapshot
            .handlers
            .into_iter()
            .filter(|h| h.module_path == module_path)
            .collect())
    }
}
