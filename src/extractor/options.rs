//! Per-task extraction options
//!
//! Pure translation from a task's output kind, quality selector and policy
//! flags into what the extraction engine should do.

use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;
use crate::types::{AudioCodec, OutputKind, QualitySelector, TaskId};

/// What the engine produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchMode {
    /// Write the thumbnail image only, skip the media
    ThumbnailOnly,
    /// Fetch the best audio and transcode it
    Audio {
        /// Target codec
        codec: AudioCodec,
        /// Transcode quality, e.g. "192K"
        quality: String,
    },
    /// Fetch video according to a format-selection expression
    Video {
        /// Format-selection expression
        format: String,
        /// Container separate streams are merged into, if any
        merge_into: Option<&'static str>,
    },
}

/// Everything the engine needs to run one task
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Output template `<processing>/<task id>.%(ext)s`
    pub output_template: PathBuf,
    /// Template for split chapter files, keyed by task id
    pub chapter_template: PathBuf,
    /// What to produce
    pub mode: FetchMode,
    /// Retries per request
    pub retries: u32,
    /// Retries per fragment
    pub fragment_retries: u32,
    /// Fragments fetched in parallel
    pub concurrent_fragments: u32,
    /// Disable playlist expansion
    pub strict_single_item: bool,
    /// Split the output by chapter markers
    pub split_into_chapters: bool,
    /// Additional raw tool arguments
    pub extra_args: Vec<String>,
}

/// Inputs to [`ExtractOptions::for_task`]
#[derive(Debug, Clone, Copy)]
pub struct TaskOptions<'a> {
    /// Task the files belong to
    pub id: &'a TaskId,
    /// Working directory
    pub processing_dir: &'a Path,
    /// Requested output kind
    pub kind: OutputKind,
    /// Requested quality
    pub quality: QualitySelector,
    /// Disable playlist expansion
    pub strict_single_item: bool,
    /// Split by chapters
    pub split_into_chapters: bool,
}

impl ExtractOptions {
    /// Build the options for one task
    pub fn for_task(task: TaskOptions<'_>, tools: &ToolsConfig) -> Self {
        let mode = match task.kind {
            OutputKind::Thumbnail => FetchMode::ThumbnailOnly,
            OutputKind::Audio(codec) => FetchMode::Audio {
                codec,
                quality: tools.audio_quality.clone(),
            },
            OutputKind::Video(_) | OutputKind::Any => FetchMode::Video {
                format: format_selector(task.quality),
                merge_into: task.kind.merge_output_format(),
            },
        };

        Self {
            output_template: task.processing_dir.join(format!("{}.%(ext)s", task.id)),
            chapter_template: task.processing_dir.join(format!(
                "{}.chapter%(section_number)03d.%(ext)s",
                task.id
            )),
            mode,
            retries: tools.retries,
            fragment_retries: tools.fragment_retries,
            concurrent_fragments: tools.concurrent_fragments,
            strict_single_item: task.strict_single_item,
            split_into_chapters: task.split_into_chapters,
            extra_args: tools.extra_args.clone(),
        }
    }
}

/// Format-selection expression for a quality selector
pub fn format_selector(quality: QualitySelector) -> String {
    match quality {
        QualitySelector::Best => "bestvideo+bestaudio/best".to_string(),
        QualitySelector::BestMobile => {
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
        }
        QualitySelector::Worst => "worstvideo+worstaudio/worst".to_string(),
        QualitySelector::MaxHeight(height) => {
            format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
        }
    }
}
