//! Scripted extractors and downloader construction

use media_dl::{
    Config, Error, ExtractOptions, Extractor, MediaDownloader, MediaMetadata, ProgressSink,
    Result, ToolProgress, ToolStatus,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Extractor that writes canned files instead of running a tool
pub struct ScriptedExtractor {
    pub title: Option<String>,
    /// Extension written into the output template
    pub extension: String,
    pub contents: Vec<u8>,
    /// Percent strings reported as `downloading` samples
    pub percents: Vec<String>,
    pub fail_with: Option<String>,
    /// Delay inside `fetch`, to keep a task in the downloading phase
    pub fetch_delay: Duration,
}

impl ScriptedExtractor {
    pub fn new(title: &str, extension: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            extension: extension.to_string(),
            contents: b"media bytes".to_vec(),
            percents: vec!["25.0%".to_string(), "75.0%".to_string(), "100.0%".to_string()],
            fail_with: None,
            fetch_delay: Duration::ZERO,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new("unused", "mp4")
        }
    }
}

impl Extractor for ScriptedExtractor {
    fn resolve_metadata(&self, _url: &str, _options: &ExtractOptions) -> Result<MediaMetadata> {
        Ok(MediaMetadata {
            title: self.title.clone(),
            ..MediaMetadata::default()
        })
    }

    fn fetch(&self, _url: &str, options: &ExtractOptions, sink: &ProgressSink) -> Result<()> {
        let target = PathBuf::from(
            options
                .output_template
                .to_string_lossy()
                .replace("%(ext)s", &self.extension),
        );

        for percent in &self.percents {
            sink.report(ToolProgress {
                status: ToolStatus::Downloading,
                filename: Some(target.to_string_lossy().into_owned()),
                percent: Some(percent.clone()),
                speed: Some("2.00MiB/s".to_string()),
                eta: Some("00:03".to_string()),
            });
        }
        std::thread::sleep(self.fetch_delay);

        if let Some(message) = &self.fail_with {
            return Err(Error::ExternalTool(message.clone()));
        }
        std::fs::write(target, &self.contents)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Config rooted in a fresh temp directory, with no settle delay
pub fn test_config() -> (Config, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.processing_dir = temp_dir.path().join("processing");
    config.download.settle_delay = Duration::ZERO;
    config.tools.search_path = false;
    (config, temp_dir)
}

/// Downloader backed by `extractor`; keep the TempDir alive for the test
pub async fn downloader_with(extractor: impl Extractor + 'static) -> (MediaDownloader, TempDir) {
    let (config, temp_dir) = test_config();
    let downloader = MediaDownloader::with_extractor(config, Arc::new(extractor))
        .await
        .unwrap();
    (downloader, temp_dir)
}
