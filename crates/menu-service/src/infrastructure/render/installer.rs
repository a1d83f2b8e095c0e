//! Browser installation via external commands.
//!
//! Installing Chromium is delegated to whatever tool the deployment uses
//! (by default `npx --yes playwright install chromium`).  The commands are
//! plain argument vectors from the settings file, run without a shell.

use std::path::PathBuf;
use std::process::ExitStatus;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Executable names probed on `PATH` to decide whether a browser exists.
const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Error type for installer commands.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The program could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The configured command line is empty.
    #[error("installer command is empty")]
    EmptyCommand,
}

/// Installs the headless browser and anything it needs.
#[async_trait]
pub trait BrowserInstaller: Send + Sync {
    /// Makes sure a browser is available, installing one if necessary.
    async fn install_dependencies(&self) -> Result<(), InstallError>;

    /// Installs the browser unconditionally.
    async fn reinstall_browser(&self) -> Result<(), InstallError>;
}

/// [`BrowserInstaller`] that runs configured commands.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    primary: Vec<String>,
    fallback: Vec<String>,
    chrome_executable: Option<PathBuf>,
}

impl CommandInstaller {
    pub fn new(primary: Vec<String>, fallback: Vec<String>, chrome_executable: Option<PathBuf>) -> Self {
        Self {
            primary,
            fallback,
            chrome_executable,
        }
    }

    /// `true` if the configured executable exists or a known browser is on `PATH`.
    pub fn browser_available(&self) -> bool {
        if let Some(path) = &self.chrome_executable {
            return path.exists();
        }
        BROWSER_CANDIDATES
            .iter()
            .any(|name| which::which(name).is_ok())
    }
}

#[async_trait]
impl BrowserInstaller for CommandInstaller {
    async fn install_dependencies(&self) -> Result<(), InstallError> {
        if self.browser_available() {
            debug!("browser already installed; skipping installation");
            return Ok(());
        }

        info!("installing headless browser");
        match run_command(&self.primary).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("browser install failed: {e}; trying fallback command");
                run_command(&self.fallback).await
            }
        }
    }

    async fn reinstall_browser(&self) -> Result<(), InstallError> {
        info!("reinstalling headless browser");
        run_command(&self.primary).await
    }
}

/// Runs `command` (program followed by its arguments) to completion.
pub async fn run_command(command: &[String]) -> Result<(), InstallError> {
    let (program, args) = command.split_first().ok_or(InstallError::EmptyCommand)?;

    debug!("running {}", command.join(" "));
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| InstallError::Spawn {
            program: program.clone(),
            source,
        })?;

    if output.status.success() {
        info!("{program} finished successfully");
        Ok(())
    } else {
        Err(InstallError::Failed {
            program: program.clone(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let result = run_command(&[]).await;
        assert!(matches!(result, Err(InstallError::EmptyCommand)));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let result = run_command(&cmd(&["definitely-not-a-real-installer-binary"])).await;
        assert!(matches!(result, Err(InstallError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_captures_stderr() {
        // Act
        let result = run_command(&cmd(&["sh", "-c", "echo broken >&2; exit 3"])).await;

        // Assert
        match result {
            Err(InstallError::Failed { program, status, stderr }) => {
                assert_eq!(program, "sh");
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_command() {
        assert!(run_command(&cmd(&["true"])).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fallback_runs_when_primary_fails() {
        // Arrange: the configured executable does not exist, so installation runs
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("fallback-ran");
        let installer = CommandInstaller::new(
            cmd(&["false"]),
            cmd(&["touch", marker.to_str().unwrap()]),
            Some(dir.path().join("no-such-chrome")),
        );

        // Act
        let result = installer.install_dependencies().await;

        // Assert
        assert!(result.is_ok());
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_both_commands_failing_reports_fallback_error() {
        let dir = tempfile::tempdir().unwrap();
        let installer = CommandInstaller::new(
            cmd(&["false"]),
            cmd(&["sh", "-c", "exit 7"]),
            Some(dir.path().join("no-such-chrome")),
        );

        let result = installer.install_dependencies().await;

        match result {
            Err(InstallError::Failed { status, .. }) => assert_eq!(status.code(), Some(7)),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_existing_executable_skips_installation() {
        // Arrange: the primary command would fail if it ran
        let dir = tempfile::tempdir().unwrap();
        let chrome = dir.path().join("chrome");
        std::fs::write(&chrome, "").unwrap();
        let installer = CommandInstaller::new(vec![], vec![], Some(chrome));

        // Act / Assert
        assert!(installer.browser_available());
        assert!(installer.install_dependencies().await.is_ok());
    }

    #[tokio::test]
    async fn test_reinstall_always_runs_primary() {
        let dir = tempfile::tempdir().unwrap();
        let chrome = dir.path().join("chrome");
        std::fs::write(&chrome, "").unwrap();
        let installer = CommandInstaller::new(vec![], vec![], Some(chrome));

        let result = installer.reinstall_browser().await;

        assert!(matches!(result, Err(InstallError::EmptyCommand)));
    }
}
