//! HTML-to-image rendering with a lazily started headless browser.
//!
//! [`HtmlRenderer`] owns one long-lived browser session and turns HTML text
//! into a PNG file.  The browser itself sits behind two small traits so the
//! state machine can be tested without Chromium:
//!
//! - [`BrowserLauncher`] starts a browser and hands back a [`BrowserSession`].
//! - [`BrowserSession`] captures one page into a file and can be closed.
//!
//! The production implementations live in [`chromium`]; browser installation
//! lives in [`installer`].
//!
//! # State machine
//!
//! ```text
//! Uninitialized ──initialize()──► Initializing ──ok──► Ready
//!                                      │
//!                                      └──launch, reinstall, relaunch all fail──► Failed
//! Failed ──initialize()──► Initializing …          Ready ──close()──► Uninitialized
//! ```
//!
//! The state is an atomic flag, not a lock: a help request that arrives
//! while another task is initializing will start its own initialization.
//! Whichever launch finishes second closes its own session and keeps the one
//! already installed; a launch that fails after another one succeeded leaves
//! the renderer ready.
//!
//! # Files
//!
//! Every successful render leaves one `help_<uuid>.png` in the scratch
//! directory.  Deleting it is the caller's job (see
//! [`crate::infrastructure::cleanup`]).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

pub mod chromium;
pub mod installer;

pub use chromium::ChromiumLauncher;
pub use installer::{BrowserInstaller, CommandInstaller, InstallError};

/// Error type for browser launch and capture.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The browser process could not be started.
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// The page could not be loaded or captured.
    #[error("failed to capture page: {0}")]
    Capture(String),

    /// No browser session is available.
    #[error("renderer is not initialized")]
    NotReady,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parameters for a single page capture.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest<'a> {
    /// Full HTML document, loaded inline.
    pub html: &'a str,
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.  The capture is full-page, so the
    /// image may be taller.
    pub height: u32,
    /// Where the PNG is written.
    pub output: &'a Path,
    /// Wait after the page has loaded and before capturing.
    pub settle_delay: Duration,
}

/// Starts a browser.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launches a browser process and connects to it.
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError>;
}

/// A running browser that can capture pages.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Renders `request.html` in a fresh isolated context and writes a
    /// full-page PNG to `request.output`.  The context is closed before
    /// returning, whether or not the capture succeeded.
    async fn capture(&self, request: &CaptureRequest<'_>) -> Result<(), RenderError>;

    /// Shuts the browser down.
    async fn close(&mut self) -> Result<(), RenderError>;
}

// ── RenderState ───────────────────────────────────────────────────────────────

/// Lifecycle state of the [`HtmlRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl RenderState {
    fn to_u8(self) -> u8 {
        match self {
            RenderState::Uninitialized => 0,
            RenderState::Initializing => 1,
            RenderState::Ready => 2,
            RenderState::Failed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => RenderState::Initializing,
            2 => RenderState::Ready,
            3 => RenderState::Failed,
            _ => RenderState::Uninitialized,
        }
    }
}

impl std::fmt::Display for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RenderState::Uninitialized => "not started",
            RenderState::Initializing => "starting",
            RenderState::Ready => "available",
            RenderState::Failed => "unavailable",
        };
        f.write_str(label)
    }
}

// ── HtmlRenderer ──────────────────────────────────────────────────────────────

/// Turns HTML into PNG files using one shared browser session.
pub struct HtmlRenderer {
    launcher: Arc<dyn BrowserLauncher>,
    installer: Arc<dyn BrowserInstaller>,
    scratch_dir: PathBuf,
    settle_delay: Duration,
    state: AtomicU8,
    session: RwLock<Option<Box<dyn BrowserSession>>>,
}

impl HtmlRenderer {
    /// Creates an uninitialized renderer.  Nothing is launched until
    /// [`initialize`](Self::initialize) or the first render.
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        installer: Arc<dyn BrowserInstaller>,
        scratch_dir: impl Into<PathBuf>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            launcher,
            installer,
            scratch_dir: scratch_dir.into(),
            settle_delay,
            state: AtomicU8::new(RenderState::Uninitialized.to_u8()),
            session: RwLock::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RenderState {
        RenderState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `true` once a browser session is available.
    pub fn is_ready(&self) -> bool {
        self.state() == RenderState::Ready
    }

    /// Directory rendered images are written to.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    fn set_state(&self, state: RenderState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }

    /// Starts the browser if it is not running yet.
    ///
    /// On a failed launch the browser is reinstalled once and the launch is
    /// retried once.  Returns whether the renderer is ready; never panics or
    /// propagates errors.
    pub async fn initialize(&self) -> bool {
        if self.is_ready() {
            return true;
        }
        self.set_state(RenderState::Initializing);

        let session = match self.launch_with_reinstall().await {
            Some(session) => session,
            None => {
                let slot = self.session.write().await;
                if slot.is_some() {
                    // A concurrent initialization already installed a session.
                    self.set_state(RenderState::Ready);
                    return true;
                }
                self.set_state(RenderState::Failed);
                return false;
            }
        };

        let mut slot = self.session.write().await;
        if slot.is_some() {
            // Another task finished initializing first; keep its session.
            drop(slot);
            close_session(session).await;
        } else {
            *slot = Some(session);
        }
        self.set_state(RenderState::Ready);
        info!("HTML renderer ready");
        true
    }

    async fn launch_with_reinstall(&self) -> Option<Box<dyn BrowserSession>> {
        let first_error = match self.launcher.launch().await {
            Ok(session) => return Some(session),
            Err(e) => e,
        };
        error!("HTML renderer initialization failed: {first_error}");

        info!("reinstalling browser before retrying");
        if let Err(e) = self.installer.reinstall_browser().await {
            error!("browser reinstall failed: {e}");
            return None;
        }

        match self.launcher.launch().await {
            Ok(session) => {
                info!("HTML renderer initialized after reinstall");
                Some(session)
            }
            Err(e) => {
                error!("HTML renderer initialization failed after reinstall: {e}");
                None
            }
        }
    }

    /// Renders `html` into a new PNG file and returns its path.
    ///
    /// Initializes the browser first if needed.  Returns `None` (and logs) if
    /// the browser is unavailable or the capture fails.
    pub async fn render_to_image(&self, html: &str, width: u32, height: u32) -> Option<PathBuf> {
        if !self.is_ready() && !self.initialize().await {
            return None;
        }

        match self.capture_to_file(html, width, height).await {
            Ok(path) => {
                info!("rendered HTML to {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("HTML render failed: {e}");
                None
            }
        }
    }

    async fn capture_to_file(&self, html: &str, width: u32, height: u32) -> Result<PathBuf, RenderError> {
        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|source| RenderError::Io {
                path: self.scratch_dir.clone(),
                source,
            })?;

        let output = self
            .scratch_dir
            .join(format!("help_{}.png", Uuid::new_v4().simple()));

        let request = CaptureRequest {
            html,
            width,
            height,
            output: &output,
            settle_delay: self.settle_delay,
        };

        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(RenderError::NotReady)?;

        if let Err(e) = session.capture(&request).await {
            // A half-written screenshot is useless; drop it now.
            let _ = tokio::fs::remove_file(&output).await;
            return Err(e);
        }
        Ok(output)
    }

    /// Closes the browser.  Safe to call when it was never started.
    pub async fn close(&self) {
        let session = self.session.write().await.take();
        if let Some(session) = session {
            close_session(session).await;
            info!("HTML renderer closed");
        }
        self.set_state(RenderState::Uninitialized);
    }
}

async fn close_session(mut session: Box<dyn BrowserSession>) {
    if let Err(e) = session.close().await {
        warn!("failed to close browser session: {e}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
