//! Shutdown coordination.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::error::Result;

use super::MediaDownloader;

/// How long shutdown waits for running tasks to reach a terminal phase
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

impl MediaDownloader {
    /// Gracefully shut down the downloader
    ///
    /// Stops accepting submissions, then waits (bounded) for running tasks
    /// to finish. Tasks are never interrupted; any still running after the
    /// grace period keep running until the process exits.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new downloads");

        match tokio::time::timeout(SHUTDOWN_GRACE, self.wait_for_active_tasks()).await {
            Ok(()) => tracing::info!("All running tasks completed"),
            Err(_) => tracing::warn!(
                still_running = self.registry.active_count().await,
                "Timeout waiting for running tasks, proceeding with shutdown"
            ),
        }

        tracing::info!("Graceful shutdown complete");
        Ok(())
    }

    async fn wait_for_active_tasks(&self) {
        loop {
            let active = self.registry.active_count().await;
            if active == 0 {
                return;
            }
            tracing::debug!(active, "Waiting for running tasks to complete");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
