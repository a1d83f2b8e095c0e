//! The `help` and `help_admin` chat commands.
//!
//! [`CommandSurface`] answers both commands by sending one or more
//! [`ChatReply`] values to a [`ChatSink`].  A host binding implements the
//! sink by turning replies into chat messages; the standalone binary prints
//! them (see [`crate::infrastructure::console`]).
//!
//! # Help fallback chain
//!
//! ```text
//! disabled?            ──► fixed "disabled" text
//! no categories?       ──► "no menu configured" text + editor URL
//! renderer not ready?  ──► text menu + install hint
//! render failed?       ──► text menu
//! otherwise            ──► PNG image, deleted after the cleanup delay
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use menu_core::{catalog_stats, format_catalog_html, format_catalog_text, format_cover_html};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::application::commands::{AdminAction, ChatCommand};
use crate::infrastructure::cleanup::CleanupScheduler;
use crate::infrastructure::render::{BrowserInstaller, HtmlRenderer};
use crate::infrastructure::storage::CatalogStore;

/// Reply to the help command when the menu is switched off.
pub const DISABLED_MESSAGE: &str = "The help menu is currently disabled.";

const RENDERER_UNAVAILABLE_NOTICE: &str =
    "Image rendering is unavailable; showing the menu as text.";
const RENDER_FAILED_NOTICE: &str = "Rendering the menu image failed; showing the menu as text.";
const INSTALL_HINT: &str = "Run /help_admin install to enable image rendering.";

/// One message sent back to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Text(String),
    /// A local image file to upload.
    Image(PathBuf),
}

impl ChatReply {
    fn text(text: impl Into<String>) -> Self {
        ChatReply::Text(text.into())
    }
}

/// Destination for replies, in the order they are produced.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn send(&self, reply: ChatReply);
}

/// Image sizes and the URL shown in replies.
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    pub editor_url: String,
    pub catalog_size: (u32, u32),
    pub cover_size: (u32, u32),
}

/// Executes menu commands.
pub struct CommandSurface {
    store: Arc<CatalogStore>,
    renderer: Arc<HtmlRenderer>,
    installer: Arc<dyn BrowserInstaller>,
    cleanup: CleanupScheduler,
    options: SurfaceOptions,
    cover: RwLock<Option<PathBuf>>,
}

impl CommandSurface {
    pub fn new(
        store: Arc<CatalogStore>,
        renderer: Arc<HtmlRenderer>,
        installer: Arc<dyn BrowserInstaller>,
        cleanup: CleanupScheduler,
        options: SurfaceOptions,
    ) -> Self {
        Self {
            store,
            renderer,
            installer,
            cleanup,
            options,
            cover: RwLock::new(None),
        }
    }

    /// Runs a parsed chat command.
    pub async fn handle(&self, command: ChatCommand, sink: &dyn ChatSink) {
        match command {
            ChatCommand::Help { verbosity } => self.help(verbosity.as_deref(), sink).await,
            ChatCommand::Admin { action } => self.admin(action, sink).await,
        }
    }

    // ── help ──────────────────────────────────────────────────────────────────

    /// Shows the catalog, as an image when possible.
    ///
    /// `verbosity` is accepted for compatibility and has no effect.
    pub async fn help(&self, verbosity: Option<&str>, sink: &dyn ChatSink) {
        debug!("help requested (verbosity: {})", verbosity.unwrap_or("default"));

        if !self.store.is_enabled().await {
            sink.send(ChatReply::text(DISABLED_MESSAGE)).await;
            return;
        }

        let categories = self.store.categories().await;
        if categories.is_empty() {
            sink.send(ChatReply::Text(format!(
                "No help menu has been configured yet.\n\n\
                 Organize your commands into categories in the web editor:\n{}",
                self.options.editor_url
            )))
            .await;
            return;
        }

        if !self.renderer.is_ready() {
            let mut text =
                format_catalog_text(&categories, &self.options.editor_url, RENDERER_UNAVAILABLE_NOTICE);
            text.push('\n');
            text.push_str(INSTALL_HINT);
            sink.send(ChatReply::Text(text)).await;
            return;
        }

        let (width, height) = self.options.catalog_size;
        let html = format_catalog_html(&categories);
        match self.renderer.render_to_image(&html, width, height).await {
            Some(path) => {
                sink.send(ChatReply::Image(path.clone())).await;
                self.cleanup.schedule(path);
            }
            None => {
                warn!("help image could not be rendered; falling back to text");
                let text =
                    format_catalog_text(&categories, &self.options.editor_url, RENDER_FAILED_NOTICE);
                sink.send(ChatReply::Text(text)).await;
            }
        }
    }

    // ── help_admin ────────────────────────────────────────────────────────────

    /// Runs an administrative action.
    pub async fn admin(&self, action: AdminAction, sink: &dyn ChatSink) {
        debug!("admin action: {}", action.keyword());

        match action {
            AdminAction::Enable => {
                let saved = self.store.set_enabled(true).await;
                sink.send(ChatReply::text(with_save_warning("The help menu is enabled.", saved)))
                    .await;
            }
            AdminAction::Disable => {
                let saved = self.store.set_enabled(false).await;
                sink.send(ChatReply::text(with_save_warning("The help menu is disabled.", saved)))
                    .await;
            }
            AdminAction::Reload => {
                self.store.reload().await;
                sink.send(ChatReply::text("Configuration reloaded.")).await;
            }
            AdminAction::Link => {
                sink.send(ChatReply::Text(format!("Web editor: {}", self.options.editor_url)))
                    .await;
            }
            AdminAction::Cover => match self.cover_path().await {
                Some(path) => sink.send(ChatReply::Image(path)).await,
                None => sink.send(ChatReply::Text(self.status_text().await)).await,
            },
            AdminAction::Install => self.install(sink).await,
            AdminAction::RenderStatus => {
                sink.send(ChatReply::Text(format!(
                    "Image rendering: {}",
                    self.renderer.state()
                )))
                .await;
            }
            AdminAction::Status => {
                sink.send(ChatReply::Text(self.status_text().await)).await;
            }
        }
    }

    async fn install(&self, sink: &dyn ChatSink) {
        sink.send(ChatReply::text("Installing image rendering dependencies...")).await;

        match self.installer.install_dependencies().await {
            Ok(()) => {
                if self.renderer.initialize().await {
                    sink.send(ChatReply::text("Image rendering dependencies installed.")).await;
                } else {
                    sink.send(ChatReply::text(
                        "Dependencies installed, but the browser still failed to start. Check the logs.",
                    ))
                    .await;
                }
            }
            Err(e) => {
                warn!("dependency installation failed: {e}");
                sink.send(ChatReply::Text(format!(
                    "Installing image rendering dependencies failed: {e}"
                )))
                .await;
            }
        }
    }

    async fn status_text(&self) -> String {
        let document = self.store.document().await;
        let (category_count, command_count) = catalog_stats(&document.categories);
        let enabled = if document.enabled { "enabled" } else { "disabled" };

        let mut text = format!(
            "Help menu: {enabled}\n\
             Categories: {category_count}\n\
             Commands: {command_count}\n\
             Image rendering: {}\n\
             Web editor: {}\n\n\
             Available actions:\n\
             /help_admin enable - enable the help menu\n\
             /help_admin disable - disable the help menu\n\
             /help_admin reload - reload the configuration file\n\
             /help_admin link - show the web editor link\n\
             /help_admin render-status - show the image rendering state\n\
             /help_admin install - install image rendering dependencies",
            self.renderer.state(),
            self.options.editor_url,
        );
        if self.cover_path().await.is_some() {
            text.push_str("\n/help_admin cover - show the cover image");
        }
        text
    }

    // ── Cover ─────────────────────────────────────────────────────────────────

    /// Renders the cover image and remembers its path.
    pub async fn generate_cover(&self) -> Option<PathBuf> {
        let (width, height) = self.options.cover_size;
        let path = self
            .renderer
            .render_to_image(&format_cover_html(), width, height)
            .await?;
        info!("cover image generated at {}", path.display());
        *self.cover.write().await = Some(path.clone());
        Some(path)
    }

    /// Path of the cover image, if one was rendered.
    pub async fn cover_path(&self) -> Option<PathBuf> {
        self.cover.read().await.clone()
    }

    /// Forgets the cover image and deletes its file.
    pub async fn discard_cover(&self) {
        if let Some(path) = self.cover.write().await.take() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("failed to delete cover image {}: {e}", path.display());
            }
        }
    }

    // ── Startup ───────────────────────────────────────────────────────────────

    /// Installs dependencies, starts the renderer and renders the cover.
    ///
    /// Meant to run in the background right after startup; every failure is
    /// logged and leaves the text fallback in place.
    pub async fn bootstrap(&self) {
        info!("checking image rendering dependencies");
        match self.installer.install_dependencies().await {
            Ok(()) => {
                info!("image rendering dependencies ready");
                self.renderer.initialize().await;
            }
            Err(e) => {
                warn!("dependency installation failed, image rendering unavailable: {e}");
                return;
            }
        }

        if self.renderer.is_ready() {
            self.generate_cover().await;
        }
    }
}

fn with_save_warning(message: &str, saved: bool) -> String {
    if saved {
        message.to_string()
    } else {
        format!("{message} (the change could not be written to disk)")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
