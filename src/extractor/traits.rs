//! Traits and types for the extraction engine

use serde::Deserialize;
use tokio::sync::mpsc;

use super::options::ExtractOptions;

/// Metadata resolved before any media is fetched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaMetadata {
    /// Title of the media item
    pub title: Option<String>,
    /// Site-specific identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Extractor the tool picked for the URL
    #[serde(default)]
    pub extractor: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Tool-side status of one progress sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    /// Bytes are flowing
    Downloading,
    /// One stream finished
    Finished,
    /// The tool reported an error for this stream
    Error,
    /// Anything else the tool may print
    Other,
}

impl ToolStatus {
    pub(crate) fn parse(raw: &str) -> Self {
        match raw {
            "downloading" => ToolStatus::Downloading,
            "finished" => ToolStatus::Finished,
            "error" => ToolStatus::Error,
            _ => ToolStatus::Other,
        }
    }
}

/// One progress sample as reported by the tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolProgress {
    /// Sample status
    pub status: ToolStatus,
    /// File the tool is currently writing
    pub filename: Option<String>,
    /// Percentage string, e.g. "42.0%"
    pub percent: Option<String>,
    /// Speed string, e.g. "1.50MiB/s"
    pub speed: Option<String>,
    /// Remaining-time string, e.g. "00:12"
    pub eta: Option<String>,
}

/// Hands progress samples from the blocking worker to the task runner
///
/// Sending never blocks; once the runner is gone samples are dropped.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::UnboundedSender<ToolProgress>,
}

impl ProgressSink {
    /// Create a sink and the receiving end the runner listens on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ToolProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Forward one sample
    pub fn report(&self, sample: ToolProgress) {
        self.tx.send(sample).ok();
    }
}

/// Interface to the external extraction/transcoding engine
///
/// Calls are blocking and long-running; the task runner invokes them on the
/// blocking thread pool. Implementations write their output files according to
/// [`ExtractOptions::output_template`].
///
/// # Examples
///
/// ```
/// use media_dl::extractor::{Extractor, UnavailableExtractor};
///
/// let extractor = UnavailableExtractor;
/// assert!(!extractor.is_available());
/// assert_eq!(extractor.name(), "unavailable");
/// ```
pub trait Extractor: Send + Sync {
    /// Resolve metadata for `url` without downloading media
    ///
    /// # Errors
    ///
    /// Returns `ExternalTool` when the tool rejects the URL or cannot reach
    /// it, `NotSupported` when no tool is installed.
    fn resolve_metadata(&self, url: &str, options: &ExtractOptions)
    -> crate::Result<MediaMetadata>;

    /// Fetch (and transcode) `url`, reporting progress through `sink`
    ///
    /// Returns once the tool has exited and every post-processing step is done.
    fn fetch(&self, url: &str, options: &ExtractOptions, sink: &ProgressSink) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;

    /// Whether this extractor can run at all
    fn is_available(&self) -> bool;
}
