//! Shared test helpers: a scripted extractor and MediaDownloader construction.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::tempdir;

use crate::broadcaster::Observer;
use crate::config::Config;
use crate::downloader::MediaDownloader;
use crate::error::{Error, Result};
use crate::extractor::{
    ExtractOptions, Extractor, MediaMetadata, ProgressSink, ToolProgress, ToolStatus,
};
use crate::types::{Event, TaskId};

/// Extractor that replays a script instead of running a tool.
///
/// `fetch` reports the scripted samples, then writes each scripted file to the
/// task's output template with the given extension.
#[derive(Default)]
pub(crate) struct FakeExtractor {
    pub(crate) title: Option<String>,
    pub(crate) metadata_error: Option<String>,
    pub(crate) samples: Vec<ToolProgress>,
    pub(crate) files: Vec<(String, Vec<u8>)>,
    pub(crate) fetch_error: Option<String>,
    /// URLs seen by `fetch`, in call order
    pub(crate) fetched: Mutex<Vec<String>>,
}

impl FakeExtractor {
    /// Resolves `title` and produces a single mp4
    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            files: vec![("mp4".to_string(), b"media".to_vec())],
            ..Self::default()
        }
    }

    pub(crate) fn producing(mut self, ext: &str, bytes: &[u8]) -> Self {
        self.files = vec![(ext.to_string(), bytes.to_vec())];
        self
    }

    pub(crate) fn with_samples(mut self, percents: &[&str]) -> Self {
        self.samples = percents
            .iter()
            .map(|p| ToolProgress {
                status: ToolStatus::Downloading,
                filename: Some("/work/stream.f137.mp4".to_string()),
                percent: Some(p.to_string()),
                speed: Some("1.00MiB/s".to_string()),
                eta: Some("00:01".to_string()),
            })
            .collect();
        self
    }

    pub(crate) fn failing_fetch(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }

    pub(crate) fn failing_metadata(mut self, message: &str) -> Self {
        self.metadata_error = Some(message.to_string());
        self
    }
}

/// `<processing>/<id>.%(ext)s` with the extension filled in
pub(crate) fn output_path(options: &ExtractOptions, ext: &str) -> PathBuf {
    PathBuf::from(
        options
            .output_template
            .to_string_lossy()
            .replace("%(ext)s", ext),
    )
}

impl Extractor for FakeExtractor {
    fn resolve_metadata(&self, _url: &str, _options: &ExtractOptions) -> Result<MediaMetadata> {
        if let Some(message) = &self.metadata_error {
            return Err(Error::ExternalTool(message.clone()));
        }
        Ok(MediaMetadata {
            title: self.title.clone(),
            ..MediaMetadata::default()
        })
    }

    fn fetch(&self, url: &str, options: &ExtractOptions, sink: &ProgressSink) -> Result<()> {
        self.fetched.lock().unwrap().push(url.to_string());
        for sample in &self.samples {
            sink.report(sample.clone());
        }
        // a partial file, like the tool leaves behind mid-download
        std::fs::write(output_path(options, "part"), b"partial")?;
        if let Some(message) = &self.fetch_error {
            return Err(Error::ExternalTool(message.clone()));
        }
        for (ext, bytes) in &self.files {
            std::fs::write(output_path(options, ext), bytes)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Helper to create a test MediaDownloader backed by `extractor`.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    extractor: FakeExtractor,
) -> (MediaDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.processing_dir = temp_dir.path().join("processing");
    config.download.settle_delay = Duration::ZERO;
    config.tools.search_path = false;

    let downloader = MediaDownloader::with_extractor(config, Arc::new(extractor))
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Collect events for `id` until its terminal event (or panic after 5 s)
pub(crate) async fn events_until_terminal(observer: &mut Observer, id: &TaskId) -> Vec<Event> {
    let mut events = Vec::new();
    let collect = async {
        loop {
            let event = observer.recv().await.unwrap();
            if event.id() != id {
                continue;
            }
            let terminal = matches!(event, Event::Finished { .. } | Event::Error { .. });
            events.push(event);
            if terminal {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), collect)
        .await
        .expect("task did not reach a terminal event in time");
    events
}
