//! Command Menu service entry point.
//!
//! Wires the catalog store, renderer, web editor and console chat loop
//! together and runs them until Ctrl+C.
//!
//! # Startup
//!
//! ```text
//! main()
//!  ├─ settings: defaults ◄─ TOML file ◄─ CLI / MENU_* environment
//!  ├─ CatalogStore::open()          -- synchronous load, defaults on error
//!  ├─ web editor                    -- spawned, stops on the shutdown token
//!  ├─ bootstrap                     -- spawned: install → initialize → cover
//!  └─ console                       -- spawned: stdin lines → CommandSurface
//! ```
//!
//! # Shutdown
//!
//! Ctrl+C cancels the shared token; the web server drains, pending image
//! deletions run immediately, and the browser is closed last.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use menu_core::PluginRegistry;
use menu_service::application::command_surface::{CommandSurface, SurfaceOptions};
use menu_service::infrastructure::cleanup::CleanupScheduler;
use menu_service::infrastructure::console::{run_console, ConsoleSink};
use menu_service::infrastructure::registry_snapshot::SnapshotRegistry;
use menu_service::infrastructure::render::{
    BrowserInstaller, ChromiumLauncher, CommandInstaller, HtmlRenderer,
};
use menu_service::infrastructure::storage::{load_settings, CatalogStore, ServiceSettings};
use menu_service::infrastructure::web_server::{run_server, AppState};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Command Menu: categorized help for chat-bot commands.
#[derive(Debug, Parser)]
#[command(
    name = "command-menu",
    about = "Command catalog service with a web editor and rendered help menus",
    version
)]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, env = "MENU_SETTINGS")]
    settings: Option<PathBuf>,

    /// Web editor port (overrides the settings file).
    #[arg(long, env = "MENU_PORT")]
    port: Option<u16>,

    /// Web editor bind address (overrides the settings file).
    ///
    /// Use `0.0.0.0` to reach the editor from other machines.
    #[arg(long, env = "MENU_BIND")]
    bind: Option<String>,

    /// Directory holding the catalog file and rendered images.
    #[arg(long, env = "MENU_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Registry snapshot (JSON) describing the host's plugins and handlers.
    ///
    /// Without it the live command list in the editor is empty.
    #[arg(long, env = "MENU_REGISTRY")]
    registry: Option<PathBuf>,

    /// Do not read chat commands from stdin.
    #[arg(long)]
    no_console: bool,
}

impl Cli {
    /// Loads the settings file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed, or if
    /// `--bind` is not an IP address.
    fn into_settings(self) -> anyhow::Result<(ServiceSettings, Options)> {
        let mut settings = load_settings(self.settings.as_deref()).with_context(|| {
            format!(
                "failed to load settings from {}",
                self.settings
                    .as_deref()
                    .map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string())
            )
        })?;

        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(bind) = &self.bind {
            settings.server.bind_address = bind
                .parse::<IpAddr>()
                .with_context(|| format!("invalid bind address: '{bind}'"))?;
        }
        if let Some(data_dir) = self.data_dir {
            settings.storage.data_dir = data_dir;
        }

        Ok((
            settings,
            Options {
                registry: self.registry,
                console: !self.no_console,
            },
        ))
    }
}

/// Runtime switches that are not part of the settings file.
#[derive(Debug)]
struct Options {
    registry: Option<PathBuf>,
    console: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (settings, options) = cli.into_settings()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.plugin.log_level)),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let result = runtime.block_on(run(settings, options));
    // A pending stdin read holds a blocking thread until the next line
    // arrives; do not wait for it.
    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

async fn run(settings: ServiceSettings, options: Options) -> anyhow::Result<()> {
    info!("Command Menu starting");
    let shutdown = CancellationToken::new();

    // ── Store and adapters ────────────────────────────────────────────────────
    let store = Arc::new(CatalogStore::open(settings.catalog_path()).await);
    info!("catalog file: {}", store.path().display());

    let registry: Arc<dyn PluginRegistry> = match &options.registry {
        Some(path) => {
            info!("reading plugin registry from {}", path.display());
            Arc::new(SnapshotRegistry::new(path))
        }
        None => {
            warn!("no registry snapshot configured; the editor's command list will be empty");
            Arc::new(SnapshotRegistry::empty())
        }
    };

    let installer: Arc<dyn BrowserInstaller> = Arc::new(CommandInstaller::new(
        settings.installer.primary_command.clone(),
        settings.installer.fallback_command.clone(),
        settings.render.chrome_executable.clone(),
    ));
    let renderer = Arc::new(HtmlRenderer::new(
        Arc::new(ChromiumLauncher::new(settings.render.chrome_executable.clone())),
        Arc::clone(&installer),
        settings.scratch_dir(),
        settings.render.settle_delay(),
    ));
    let cleanup = CleanupScheduler::new(settings.render.cleanup_delay(), shutdown.clone());

    let editor_url = settings.editor_url();
    let surface = Arc::new(CommandSurface::new(
        Arc::clone(&store),
        Arc::clone(&renderer),
        Arc::clone(&installer),
        cleanup.clone(),
        SurfaceOptions {
            editor_url: editor_url.clone(),
            catalog_size: (settings.render.catalog_width, settings.render.catalog_height),
            cover_size: (settings.render.cover_width, settings.render.cover_height),
        },
    ));

    // ── Web editor ────────────────────────────────────────────────────────────
    let addr = settings.server_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind web editor to {addr}"))?;
    let state = Arc::new(AppState {
        store: Arc::clone(&store),
        registry,
        self_name: settings.plugin.self_name.clone(),
        editor_page: settings.plugin.editor_page.clone(),
    });
    let server = tokio::spawn(run_server(listener, state, shutdown.clone()));
    info!("web editor: {editor_url}");

    // ── Background bootstrap ──────────────────────────────────────────────────
    let bootstrap = tokio::spawn({
        let surface = Arc::clone(&surface);
        async move { surface.bootstrap().await }
    });

    // ── Console ───────────────────────────────────────────────────────────────
    let console = options.console.then(|| {
        let surface = Arc::clone(&surface);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let sink = ConsoleSink::new(tokio::io::stdout());
            let input = BufReader::new(tokio::io::stdin());
            if let Err(e) = run_console(input, &surface, &sink, shutdown).await {
                error!("console stopped: {e}");
            }
        })
    });

    info!("Command Menu ready.  Press Ctrl-C to exit.");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C: {e}");
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    info!("shutdown signal received");
    shutdown.cancel();
    bootstrap.abort();
    if let Some(console) = console {
        console.abort();
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("web editor failed: {e}"),
        Err(e) => error!("web editor task panicked: {e}"),
    }
    cleanup.shutdown().await;
    surface.discard_cover().await;
    renderer.close().await;

    info!("Command Menu stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
