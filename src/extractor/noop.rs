//! Stand-in extractor used when no yt-dlp binary is available

use super::options::ExtractOptions;
use super::traits::{Extractor, MediaMetadata, ProgressSink};

const MISSING_BINARY: &str = "Downloading requires the yt-dlp binary. \
     Configure tools.ytdlp_path or ensure yt-dlp is in PATH.";

/// Extractor that fails every call with `NotSupported`
///
/// Lets the service start without the tool; each submitted task then ends
/// with an `error` event instead of the process refusing to run.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableExtractor;

impl Extractor for UnavailableExtractor {
    fn resolve_metadata(&self, _url: &str, _options: &ExtractOptions) -> crate::Result<MediaMetadata> {
        Err(crate::Error::NotSupported(MISSING_BINARY.into()))
    }

    fn fetch(&self, _url: &str, _options: &ExtractOptions, _sink: &ProgressSink) -> crate::Result<()> {
        Err(crate::Error::NotSupported(MISSING_BINARY.into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsConfig;
    use crate::extractor::options::TaskOptions;
    use crate::types::{OutputKind, QualitySelector, TaskId};
    use std::path::Path;

    fn options() -> ExtractOptions {
        let id = TaskId::from("t");
        ExtractOptions::for_task(
            TaskOptions {
                id: &id,
                processing_dir: Path::new("/work"),
                kind: OutputKind::Any,
                quality: QualitySelector::Best,
                strict_single_item: false,
                split_into_chapters: false,
            },
            &ToolsConfig::default(),
        )
    }

    #[test]
    fn every_call_is_not_supported() {
        let extractor = UnavailableExtractor;
        let (sink, _rx) = ProgressSink::channel();

        assert!(matches!(
            extractor.resolve_metadata("https://example.test", &options()),
            Err(crate::Error::NotSupported(_))
        ));
        assert!(matches!(
            extractor.fetch("https://example.test", &options(), &sink),
            Err(crate::Error::NotSupported(_))
        ));
        assert!(!extractor.is_available());
    }
}
