//! # media-dl
//!
//! Media download orchestration over yt-dlp.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Fire-and-forget** - Submission returns a task id immediately, the work runs in the background
//! - **Event-driven** - Consumers subscribe to progress events, no polling required
//! - **Safe with filenames** - Every name that touches the output directory is sanitized and validated
//! - **Library-first** - The REST/SSE surface is an optional layer over [`MediaDownloader`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, DownloadRequest, MediaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = MediaDownloader::new(Config::default()).await?;
//!
//!     // Subscribe before submitting so no event is missed
//!     let mut observer = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = observer.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let mut request = DownloadRequest::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
//!     request.output_kind = "mp3".to_string();
//!     let id = downloader.submit(request).await?;
//!     println!("Started task {}", id);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Progress event fan-out
pub mod broadcaster;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// External extraction tool seam
pub mod extractor;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use broadcaster::{Broadcaster, Observer};
pub use config::Config;
pub use downloader::MediaDownloader;
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use extractor::{
    CliExtractor, ExtractOptions, Extractor, MediaMetadata, ProgressSink, ToolProgress,
    ToolStatus, UnavailableExtractor,
};
pub use types::{
    AudioCodec, Capabilities, DownloadRequest, Event, OutputFile, OutputKind, Phase,
    ProgressStatus, QualitySelector, TaskId, TaskInfo, VideoContainer,
};
pub use utils::sanitize_filename;

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal, then stops accepting submissions and
/// gives running tasks a grace period via [`MediaDownloader::shutdown`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use media_dl::{MediaDownloader, Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = MediaDownloader::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(&downloader).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: &MediaDownloader) -> Result<()> {
    wait_for_signal().await;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
