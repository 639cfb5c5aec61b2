//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`registry`] - Task records and lifecycle transitions
//! - [`submit`] - Request validation and task scheduling
//! - [`download_task`] - The per-task runner driving the extractor
//! - [`files`] - Listing, retrieval and deletion of finished artifacts
//! - [`lifecycle`] - Shutdown coordination

mod download_task;
mod files;
mod lifecycle;
mod registry;
mod submit;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub(crate) use registry::TaskRegistry;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::broadcaster::{Broadcaster, Observer};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extractor::{CliExtractor, Extractor, UnavailableExtractor};
use crate::types::{Capabilities, Event, TaskId, TaskInfo};

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event fan-out to every observer
    pub(crate) broadcaster: Broadcaster,
    /// Task records keyed by id
    pub(crate) registry: TaskRegistry,
    /// Extraction engine (trait object so tests can script it)
    pub(crate) extractor: Arc<dyn Extractor>,
    /// Cleared during shutdown; submissions are refused afterwards
    pub(crate) accepting_new: Arc<AtomicBool>,
}

impl MediaDownloader {
    /// Create a new MediaDownloader instance
    ///
    /// Creates the output and working directories and picks the extractor:
    /// the configured `ytdlp_path`, else `yt-dlp` found on PATH (when
    /// `search_path` is set), else [`UnavailableExtractor`]. A missing binary
    /// is not a startup error; tasks then fail with an `error` event.
    pub async fn new(config: Config) -> Result<Self> {
        let extractor: Arc<dyn Extractor> = if let Some(ref path) = config.tools.ytdlp_path {
            Arc::new(CliExtractor::new(path.clone()))
        } else if config.tools.search_path {
            CliExtractor::from_path()
                .map(|e| Arc::new(e) as Arc<dyn Extractor>)
                .unwrap_or_else(|| Arc::new(UnavailableExtractor))
        } else {
            Arc::new(UnavailableExtractor)
        };

        Self::with_extractor(config, extractor).await
    }

    /// Create a MediaDownloader with an explicit extraction engine
    pub async fn with_extractor(config: Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
        config.validate()?;

        for (key, dir) in [
            ("download_dir", &config.download.download_dir),
            ("processing_dir", &config.download.processing_dir),
        ] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create {} '{}': {}", key, dir.display(), e),
                ))
            })?;
        }

        if extractor.is_available() {
            tracing::info!(extractor = extractor.name(), "Extractor initialized");
        } else {
            tracing::warn!(
                extractor = extractor.name(),
                "No yt-dlp binary available; submitted tasks will fail"
            );
        }

        Ok(Self {
            broadcaster: Broadcaster::new(config.download.event_buffer),
            config: Arc::new(config),
            registry: TaskRegistry::new(),
            extractor,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Subscribe to task events
    ///
    /// Each observer receives every event broadcast after it subscribed.
    /// An observer that falls behind by more than `event_buffer` events gets
    /// a `RecvError::Lagged` and continues with the newest ones.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, DownloadRequest, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{:?}", event);
    ///         }
    ///     });
    ///
    ///     downloader
    ///         .submit(DownloadRequest::new("https://example.com/watch?v=abc"))
    ///         .await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> Observer {
        self.broadcaster.subscribe()
    }

    /// Remove an observer
    pub fn unsubscribe(&self, observer: Observer) {
        self.broadcaster.unsubscribe(observer);
    }

    /// Deliver an event to every observer; returns how many received it
    pub fn broadcast(&self, event: Event) -> usize {
        self.broadcaster.broadcast(event)
    }

    /// Number of connected observers
    pub fn observer_count(&self) -> usize {
        self.broadcaster.observer_count()
    }

    /// Look up one task
    pub async fn task(&self, id: &TaskId) -> Option<TaskInfo> {
        self.registry.get(id).await
    }

    /// All tasks, oldest first
    pub async fn tasks(&self) -> Vec<TaskInfo> {
        self.registry.list().await
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Which extraction engine is in use
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            extractor: self.extractor.name().to_string(),
            extractor_available: self.extractor.is_available(),
        }
    }

    /// Spawn the REST API server in a background task
    ///
    /// Listens on the configured bind address (default: 127.0.0.1:8000).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
