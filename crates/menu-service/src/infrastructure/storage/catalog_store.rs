//! JSON persistence for the category catalog.
//!
//! The whole catalog is one document, `<data_dir>/custom_commands.json`.
//! [`CatalogStore`] keeps the current document in memory, answers reads from
//! memory and writes the full document back to disk after every mutation.
//!
//! # Failure policy
//!
//! The store never returns an error to its callers.  A missing or corrupt
//! file loads as [`CategoryConfig::default`] (enabled, no categories); a
//! failed write is logged and reported as `false`.  The typed
//! [`StoreError`] exists so the log lines say exactly what went wrong.
//!
//! # Concurrency
//!
//! Writes replace the file atomically (temp file + rename), and the document
//! lock is held until the rename completes, so the file on disk always
//! matches the last completed mutation.  Two editors saving at the same time
//! are applied in lock order: the last one wins.

use std::path::{Path, PathBuf};

use menu_core::{Category, CategoryConfig};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// File name of the catalog document inside the data directory.
pub const CATALOG_FILE_NAME: &str = "custom_commands.json";

/// Error type for catalog file operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid catalog document.
    #[error("failed to parse catalog JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// The in-memory document could not be serialized.
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The catalog document plus the file it is persisted to.
#[derive(Debug)]
pub struct CatalogStore {
    path: PathBuf,
    document: RwLock<CategoryConfig>,
}

impl CatalogStore {
    /// Opens the store at `path`, loading the current document.
    ///
    /// The file does not have to exist; it is created on the first save.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = load_or_default(&path).await;
        Self {
            path,
            document: RwLock::new(document),
        }
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document from disk without touching the in-memory copy.
    ///
    /// Returns the default document if the file is missing or unreadable.
    pub async fn load(&self) -> CategoryConfig {
        load_or_default(&self.path).await
    }

    /// Writes the in-memory document to disk.
    ///
    /// Returns `false` (and logs) if the write failed.
    pub async fn save(&self) -> bool {
        let document = self.document.read().await;
        persist(&self.path, &document).await
    }

    /// A snapshot of the whole document.
    pub async fn document(&self) -> CategoryConfig {
        self.document.read().await.clone()
    }

    /// Whether the help command is enabled.
    pub async fn is_enabled(&self) -> bool {
        self.document.read().await.enabled
    }

    /// Enables or disables the help command and saves.
    pub async fn set_enabled(&self, enabled: bool) -> bool {
        let mut document = self.document.write().await;
        document.enabled = enabled;
        let saved = persist(&self.path, &document).await;
        debug!("help menu {}", if enabled { "enabled" } else { "disabled" });
        saved
    }

    /// A snapshot of the configured categories.
    pub async fn categories(&self) -> Vec<Category> {
        self.document.read().await.categories.clone()
    }

    /// Replaces all categories and saves.
    ///
    /// Returns whether the new document reached the disk.  The in-memory
    /// document is updated either way.
    pub async fn set_categories(&self, categories: Vec<Category>) -> bool {
        let mut document = self.document.write().await;
        debug!("replacing catalog with {} categories", categories.len());
        document.categories = categories;
        persist(&self.path, &document).await
    }

    /// Re-reads the document from disk, discarding the in-memory copy.
    pub async fn reload(&self) {
        let fresh = load_or_default(&self.path).await;
        *self.document.write().await = fresh;
        info!("catalog reloaded from {}", self.path.display());
    }
}

// ── File helpers ──────────────────────────────────────────────────────────────

async fn load_or_default(path: &Path) -> CategoryConfig {
    match read_document(path).await {
        Ok(Some(document)) => {
            debug!("loaded catalog from {}", path.display());
            document
        }
        Ok(None) => {
            debug!("no catalog at {}; using defaults", path.display());
            CategoryConfig::default()
        }
        Err(e) => {
            error!("failed to load catalog: {e}; using defaults");
            CategoryConfig::default()
        }
    }
}

async fn persist(path: &Path, document: &CategoryConfig) -> bool {
    match write_document(path, document).await {
        Ok(()) => {
            debug!("catalog saved to {}", path.display());
            true
        }
        Err(e) => {
            error!("failed to save catalog: {e}");
            false
        }
    }
}

/// Reads and parses the catalog file.  `Ok(None)` means the file does not exist.
async fn read_document(path: &Path) -> Result<Option<CategoryConfig>, StoreError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content)
            .map(Some)
            .map_err(StoreError::Parse),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Serializes `document` and atomically replaces the file at `path`.
///
/// Creates the parent directory if needed.
async fn write_document(path: &Path, document: &CategoryConfig) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }
    }

    let content = serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, content)
        .await
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
