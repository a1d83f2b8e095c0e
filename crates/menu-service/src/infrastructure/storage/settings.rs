//! TOML settings for the service.
//!
//! Every field has a default, so the settings file is optional and may list
//! only the values that differ:
//!
//! ```toml
//! [server]
//! port = 9090
//!
//! [render]
//! cleanup_delay_secs = 60
//! chrome_executable = "/usr/bin/chromium"
//! ```
//!
//! Command-line flags (see `main.rs`) override the values read here.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Settings schema ───────────────────────────────────────────────────────────

/// Top-level service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceSettings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub installer: InstallerSettings,
    #[serde(default)]
    pub plugin: PluginSettings,
}

/// Web editor listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Address the web editor binds to.  Loopback by default.
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    /// Port the web editor listens on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Where files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// Holds `custom_commands.json` and the `temp/` scratch directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Image sizes and timings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderSettings {
    #[serde(default = "default_catalog_width")]
    pub catalog_width: u32,
    #[serde(default = "default_catalog_height")]
    pub catalog_height: u32,
    #[serde(default = "default_cover_width")]
    pub cover_width: u32,
    #[serde(default = "default_cover_height")]
    pub cover_height: u32,
    /// Extra wait after the page has loaded, before the screenshot.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// How long a rendered help image stays on disk after it was sent.
    #[serde(default = "default_cleanup_delay_secs")]
    pub cleanup_delay_secs: u64,
    /// Explicit browser binary.  When absent the browser is looked up on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
}

/// Commands that install the headless browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstallerSettings {
    /// Tried first; also used for the renderer's one reinstall attempt.
    #[serde(default = "default_primary_command")]
    pub primary_command: Vec<String>,
    /// Tried when the primary command fails.
    #[serde(default = "default_fallback_command")]
    pub fallback_command: Vec<String>,
}

/// How the service presents itself to the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginSettings {
    /// Our own plugin name in the host registry; excluded from extraction.
    #[serde(default = "default_self_name")]
    pub self_name: String,
    /// Editor page served at `GET /` in place of the bundled one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_page: Option<PathBuf>,
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
fn default_port() -> u16 {
    8081
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data/plugins/command_menu")
}
fn default_catalog_width() -> u32 {
    1000
}
fn default_catalog_height() -> u32 {
    1600
}
fn default_cover_width() -> u32 {
    900
}
fn default_cover_height() -> u32 {
    700
}
fn default_settle_delay_ms() -> u64 {
    1000
}
fn default_cleanup_delay_secs() -> u64 {
    30
}
fn default_primary_command() -> Vec<String> {
    ["npx", "--yes", "playwright", "install", "chromium"]
        .map(String::from)
        .to_vec()
}
fn default_fallback_command() -> Vec<String> {
    ["npx", "--yes", "playwright", "install"].map(String::from).to_vec()
}
fn default_self_name() -> String {
    "command_menu".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            catalog_width: default_catalog_width(),
            catalog_height: default_catalog_height(),
            cover_width: default_cover_width(),
            cover_height: default_cover_height(),
            settle_delay_ms: default_settle_delay_ms(),
            cleanup_delay_secs: default_cleanup_delay_secs(),
            chrome_executable: None,
        }
    }
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            primary_command: default_primary_command(),
            fallback_command: default_fallback_command(),
        }
    }
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            self_name: default_self_name(),
            editor_page: None,
            log_level: default_log_level(),
        }
    }
}

impl ServiceSettings {
    /// Socket address of the web editor.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.bind_address, self.server.port)
    }

    /// URL operators open to edit the catalog.
    pub fn editor_url(&self) -> String {
        let bind = self.server.bind_address;
        if bind.is_unspecified() || bind.is_loopback() {
            format!("http://localhost:{}", self.server.port)
        } else {
            // SocketAddr brackets IPv6 hosts.
            format!("http://{}", self.server_addr())
        }
    }

    /// Path of the catalog document.
    pub fn catalog_path(&self) -> PathBuf {
        self.storage.data_dir.join(super::CATALOG_FILE_NAME)
    }

    /// Directory rendered images are written to.
    pub fn scratch_dir(&self) -> PathBuf {
        self.storage.data_dir.join("temp")
    }
}

impl RenderSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Loads settings from `path`, or returns defaults when `path` is `None` or
/// the file does not exist.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] for file-system errors other than "not
/// found", and [`SettingsError::Parse`] if the TOML is malformed.
pub fn load_settings(path: Option<&Path>) -> Result<ServiceSettings, SettingsError> {
    let Some(path) = path else {
        return Ok(ServiceSettings::default());
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServiceSettings::default()),
        Err(source) => Err(SettingsError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_listen_on_localhost_8081() {
        let settings = ServiceSettings::default();
        assert_eq!(settings.server_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(settings.editor_url(), "http://localhost:8081");
    }

    #[test]
    fn test_default_render_sizes_and_delays() {
        let render = RenderSettings::default();
        assert_eq!((render.catalog_width, render.catalog_height), (1000, 1600));
        assert_eq!((render.cover_width, render.cover_height), (900, 700));
        assert_eq!(render.settle_delay(), Duration::from_millis(1000));
        assert_eq!(render.cleanup_delay(), Duration::from_secs(30));
        assert!(render.chrome_executable.is_none());
    }

    #[test]
    fn test_paths_derive_from_data_dir() {
        let mut settings = ServiceSettings::default();
        settings.storage.data_dir = PathBuf::from("/srv/menu");
        assert_eq!(settings.catalog_path(), PathBuf::from("/srv/menu/custom_commands.json"));
        assert_eq!(settings.scratch_dir(), PathBuf::from("/srv/menu/temp"));
    }

    #[test]
    fn test_editor_url_uses_explicit_lan_address() {
        let mut settings = ServiceSettings::default();
        settings.server.bind_address = "192.168.1.20".parse().unwrap();
        settings.server.port = 9000;
        assert_eq!(settings.editor_url(), "http://192.168.1.20:9000");
    }

    #[test]
    fn test_editor_url_brackets_ipv6_address() {
        let mut settings = ServiceSettings::default();
        settings.server.bind_address = "fe80::1".parse().unwrap();
        assert_eq!(settings.editor_url(), "http://[fe80::1]:8081");
    }

    #[test]
    fn test_ipv6_loopback_editor_url_is_localhost() {
        let mut settings = ServiceSettings::default();
        settings.server.bind_address = "::1".parse().unwrap();
        assert_eq!(settings.editor_url(), "http://localhost:8081");
    }

    #[test]
    fn test_editor_page_defaults_to_bundled_copy() {
        assert!(ServiceSettings::default().plugin.editor_page.is_none());

        let settings: ServiceSettings =
            toml::from_str("[plugin]\neditor_page = \"/srv/menu/editor.html\"\n").unwrap();
        assert_eq!(settings.plugin.editor_page, Some(PathBuf::from("/srv/menu/editor.html")));
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: ServiceSettings = toml::from_str("").expect("deserialize empty");
        assert_eq!(settings, ServiceSettings::default());
    }

    #[test]
    fn test_partial_toml_overrides_only_listed_fields() {
        // Arrange
        let toml_str = r#"
[server]
port = 9999

[render]
cleanup_delay_secs = 5
chrome_executable = "/opt/chrome/chrome"
"#;

        // Act
        let settings: ServiceSettings = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.server.bind_address, default_bind_address());
        assert_eq!(settings.render.cleanup_delay_secs, 5);
        assert_eq!(settings.render.catalog_width, 1000);
        assert_eq!(
            settings.render.chrome_executable,
            Some(PathBuf::from("/opt/chrome/chrome"))
        );
    }

    #[test]
    fn test_load_settings_without_path_returns_defaults() {
        assert_eq!(load_settings(None).unwrap(), ServiceSettings::default());
    }

    #[test]
    fn test_load_settings_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.toml");
        assert_eq!(load_settings(Some(&path)).unwrap(), ServiceSettings::default());
    }

    #[test]
    fn test_load_settings_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.toml");
        std::fs::write(&path, "[plugin]\nself_name = \"my_menu\"\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.plugin.self_name, "my_menu");
    }

    #[test]
    fn test_load_settings_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_settings(Some(&path));

        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let mut settings = ServiceSettings::default();
        settings.installer.primary_command = vec!["install-browser".to_string()];
        settings.render.chrome_executable = Some(PathBuf::from("/usr/bin/chromium"));

        let toml_str = toml::to_string_pretty(&settings).expect("serialize");
        let restored: ServiceSettings = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(settings, restored);
    }
}
