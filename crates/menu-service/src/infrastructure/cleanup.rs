//! Deferred deletion of rendered images.
//!
//! A help image has to stay on disk long enough for the chat platform to
//! upload it, then it is garbage.  [`CleanupScheduler::schedule`] spawns a
//! detached job per file that sleeps for the delay and deletes the file.
//!
//! Jobs are tracked on a [`TaskTracker`].  When the shutdown token is
//! cancelled every pending job wakes early, deletes its file and exits, so
//! [`CleanupScheduler::shutdown`] returns promptly and leaves no images
//! behind.

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Spawns and tracks delayed file deletions.
#[derive(Debug, Clone)]
pub struct CleanupScheduler {
    delay: Duration,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl CleanupScheduler {
    /// Creates a scheduler whose jobs wait `delay` or until `shutdown` is cancelled.
    pub fn new(delay: Duration, shutdown: CancellationToken) -> Self {
        Self {
            delay,
            tracker: TaskTracker::new(),
            shutdown,
        }
    }

    /// Deletion delay applied to every scheduled file.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `path` for deletion.  Returns immediately.
    pub fn schedule(&self, path: PathBuf) {
        let delay = self.delay;
        let shutdown = self.shutdown.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.cancelled() => {
                    debug!("shutdown: deleting {} early", path.display());
                }
            }
            delete_file(&path).await;
        });
    }

    /// Number of jobs still pending.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Waits for every scheduled job to finish.
    ///
    /// Call after cancelling the shutdown token; otherwise this waits out
    /// the full delay of the newest job.
    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

async fn delete_file(path: &std::path::Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("deleted {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} already removed", path.display());
        }
        Err(e) => warn!("failed to delete {}: {e}", path.display()),
    }
}
