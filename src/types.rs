//! Core types for media-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Maximum length of a caller-supplied task identifier
const MAX_TASK_ID_LEN: usize = 64;

/// Unique identifier for a download task
///
/// Task identifiers become part of working-directory filenames, so only
/// `[A-Za-z0-9_-]` is accepted from callers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a fresh random identifier (UUID v4)
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Validate a caller-supplied identifier
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || raw.len() > MAX_TASK_ID_LEN {
            return Err(Error::RequestInvalid(format!(
                "task id must be 1-{MAX_TASK_ID_LEN} characters"
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(Error::RequestInvalid(
                "task id may only contain letters, digits, '-' and '_'".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audio codecs the extraction post-step can transcode to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioCodec {
    /// MPEG-1 Layer III
    Mp3,
    /// AAC in an MPEG-4 container
    M4a,
    /// Opus
    Opus,
    /// Uncompressed PCM
    Wav,
    /// Free Lossless Audio Codec
    Flac,
}

impl AudioCodec {
    /// Codec name as understood by the extraction tool, also the file extension
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCodec::Mp3 => "mp3",
            AudioCodec::M4a => "m4a",
            AudioCodec::Opus => "opus",
            AudioCodec::Wav => "wav",
            AudioCodec::Flac => "flac",
        }
    }
}

/// Video containers a caller may request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoContainer {
    /// MPEG-4 (merged by default)
    Mp4,
    /// WebM, passed through unmerged
    Webm,
    /// Matroska, passed through unmerged
    Mkv,
}

impl VideoContainer {
    /// Container name, also the file extension
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoContainer::Mp4 => "mp4",
            VideoContainer::Webm => "webm",
            VideoContainer::Mkv => "mkv",
        }
    }
}

/// Requested output kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Audio-only, transcoded to the given codec
    Audio(AudioCodec),
    /// Video in the given container
    Video(VideoContainer),
    /// Whatever the best source is, merged into mp4
    Any,
    /// Only the thumbnail image
    Thumbnail,
}

impl OutputKind {
    /// Extension probed first when looking for the produced artifact
    pub fn preferred_extension(&self) -> &'static str {
        match self {
            OutputKind::Audio(codec) => codec.as_str(),
            OutputKind::Video(container) => container.as_str(),
            OutputKind::Any => "mp4",
            OutputKind::Thumbnail => "jpg",
        }
    }

    /// Container the tool should merge separate video/audio streams into
    pub fn merge_output_format(&self) -> Option<&'static str> {
        match self {
            OutputKind::Video(VideoContainer::Mp4) | OutputKind::Any => Some("mp4"),
            OutputKind::Video(_) | OutputKind::Audio(_) | OutputKind::Thumbnail => None,
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "mp3" => OutputKind::Audio(AudioCodec::Mp3),
            "m4a" => OutputKind::Audio(AudioCodec::M4a),
            "opus" => OutputKind::Audio(AudioCodec::Opus),
            "wav" => OutputKind::Audio(AudioCodec::Wav),
            "flac" => OutputKind::Audio(AudioCodec::Flac),
            "mp4" => OutputKind::Video(VideoContainer::Mp4),
            "webm" => OutputKind::Video(VideoContainer::Webm),
            "mkv" => OutputKind::Video(VideoContainer::Mkv),
            "any" | "best" => OutputKind::Any,
            "thumbnail" => OutputKind::Thumbnail,
            other => {
                return Err(Error::RequestInvalid(format!(
                    "unsupported output kind '{other}'"
                )));
            }
        };
        Ok(kind)
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Audio(codec) => f.write_str(codec.as_str()),
            OutputKind::Video(container) => f.write_str(container.as_str()),
            OutputKind::Any => f.write_str("any"),
            OutputKind::Thumbnail => f.write_str("thumbnail"),
        }
    }
}

/// Caller preference resolved into a format-selection expression
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualitySelector {
    /// Best video + best audio
    Best,
    /// Best mp4/m4a combination playable on mobile devices
    BestMobile,
    /// Worst video + worst audio
    Worst,
    /// Best video at or under the given height
    MaxHeight(u32),
}

impl QualitySelector {
    /// Parse a selector; unrecognized values fall back to [`QualitySelector::Best`]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "best" => QualitySelector::Best,
            "best_ios" => QualitySelector::BestMobile,
            "worst" => QualitySelector::Worst,
            _ => raw
                .strip_suffix('p')
                .filter(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
                .and_then(|digits| digits.parse().ok())
                .map(QualitySelector::MaxHeight)
                .unwrap_or(QualitySelector::Best),
        }
    }
}

/// Download request as accepted by [`crate::MediaDownloader::submit`]
///
/// Field aliases accept the older wire names (`format`, `quality`,
/// `strict_mode`, `split_chapters`).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Source URL (http or https)
    pub url: String,

    /// Output kind: mp3, m4a, opus, wav, flac, mp4, webm, mkv, any, thumbnail
    #[serde(default = "default_output_kind", alias = "format")]
    pub output_kind: String,

    /// Quality selector: best, best_ios, worst or a height such as 720p
    #[serde(default = "default_quality", alias = "quality")]
    pub quality_selector: String,

    /// Optional client-supplied task identifier
    #[serde(default)]
    pub task_id: Option<String>,

    /// Refuse playlist expansion
    #[serde(default, alias = "strict_mode")]
    pub strict_single_item: bool,

    /// Split the output by chapter markers
    #[serde(default, alias = "split_chapters")]
    pub split_into_chapters: bool,
}

impl DownloadRequest {
    /// Request with default kind and quality for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            output_kind: default_output_kind(),
            quality_selector: default_quality(),
            task_id: None,
            strict_single_item: false,
            split_into_chapters: false,
        }
    }
}

fn default_output_kind() -> String {
    "mp4".to_string()
}

fn default_quality() -> String {
    "best".to_string()
}

/// Lifecycle phase of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Registered, runner not yet started
    Submitted,
    /// Runner started, nothing fetched yet
    Initializing,
    /// Title known
    MetadataResolved,
    /// Fetch/transcode in progress
    Downloading,
    /// Locating and relocating the artifact
    Finalizing,
    /// Artifact relocated into the output directory
    Finished,
    /// Any step failed
    Failed,
}

impl Phase {
    fn rank(&self) -> u8 {
        match self {
            Phase::Submitted => 0,
            Phase::Initializing => 1,
            Phase::MetadataResolved => 2,
            Phase::Downloading => 3,
            Phase::Finalizing => 4,
            Phase::Finished => 5,
            Phase::Failed => 6,
        }
    }

    /// Whether no further transition is allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished | Phase::Failed)
    }

    /// Whether `next` is the legal successor of this phase
    pub fn can_advance_to(&self, next: Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Phase::Failed => true,
            _ => next.rank() == self.rank() + 1,
        }
    }
}

/// Status carried by a `progress` event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Runner started
    Initializing,
    /// Metadata resolved; `filename` holds the title
    Starting,
    /// Fetch sample
    Downloading,
    /// Fetch complete, artifact being finalized
    Merging,
}

/// Event broadcast to every observer
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task progress
    Progress {
        /// Task ID
        id: TaskId,
        /// Sub-phase of the task
        status: ProgressStatus,
        /// Percentage string, e.g. "42.0%"
        percent: String,
        /// Speed string as reported by the tool
        #[serde(skip_serializing_if = "Option::is_none")]
        speed: Option<String>,
        /// Remaining-time string as reported by the tool
        #[serde(skip_serializing_if = "Option::is_none")]
        eta: Option<String>,
        /// Working filename, or the title for `starting`
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },

    /// Artifact relocated into the output directory
    Finished {
        /// Task ID
        id: TaskId,
        /// Final basename in the output directory
        filename: String,
        /// Size in bytes
        file_size: u64,
    },

    /// Task failed
    Error {
        /// Task ID
        id: TaskId,
        /// Source URL
        url: String,
        /// Error message
        error: String,
    },
}

impl Event {
    /// Task the event belongs to
    pub fn id(&self) -> &TaskId {
        match self {
            Event::Progress { id, .. } | Event::Finished { id, .. } | Event::Error { id, .. } => id,
        }
    }

    /// Wire name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Progress { .. } => "progress",
            Event::Finished { .. } => "finished",
            Event::Error { .. } => "error",
        }
    }
}

/// Task record as exposed by the registry
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskInfo {
    /// Task ID
    pub id: TaskId,
    /// Source URL
    pub url: String,
    /// Requested output kind
    pub output_kind: String,
    /// Requested quality selector
    pub quality_selector: String,
    /// Playlist expansion disabled
    pub strict_single_item: bool,
    /// Chapter splitting requested
    pub split_into_chapters: bool,
    /// Current lifecycle phase
    pub phase: Phase,
    /// Resolved title
    pub title: Option<String>,
    /// Final basename once finished
    pub filename: Option<String>,
    /// Final size once finished
    pub file_size: Option<u64>,
    /// Failure description
    pub error: Option<String>,
    /// When the task was submitted
    pub created_at: DateTime<Utc>,
}

/// A finished file in the output directory
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OutputFile {
    /// Basename
    pub filename: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Last modification time
    pub modified: Option<DateTime<Utc>>,
}

/// Capabilities of the running service
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Extractor implementation name
    pub extractor: String,
    /// Whether the extractor can run at all
    pub extractor_available: bool,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_one_step_at_a_time() {
        let order = [
            Phase::Submitted,
            Phase::Initializing,
            Phase::MetadataResolved,
            Phase::Downloading,
            Phase::Finalizing,
            Phase::Finished,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
            assert!(!pair[1].can_advance_to(pair[0]), "{:?} -> {:?}", pair[1], pair[0]);
        }
        assert!(!Phase::Initializing.can_advance_to(Phase::Downloading));
    }

    #[test]
    fn failed_is_reachable_from_every_non_terminal_phase() {
        for phase in [
            Phase::Submitted,
            Phase::Initializing,
            Phase::MetadataResolved,
            Phase::Downloading,
            Phase::Finalizing,
        ] {
            assert!(phase.can_advance_to(Phase::Failed), "{phase:?}");
        }
    }

    #[test]
    fn terminal_phases_accept_nothing() {
        for terminal in [Phase::Finished, Phase::Failed] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_advance_to(Phase::Failed));
            assert!(!terminal.can_advance_to(Phase::Initializing));
        }
    }

    #[test]
    fn output_kind_parses_known_values() {
        assert_eq!(
            "mp3".parse::<OutputKind>().unwrap(),
            OutputKind::Audio(AudioCodec::Mp3)
        );
        assert_eq!(
            "MP4".parse::<OutputKind>().unwrap(),
            OutputKind::Video(VideoContainer::Mp4)
        );
        assert_eq!("best".parse::<OutputKind>().unwrap(), OutputKind::Any);
        assert_eq!(
            "thumbnail".parse::<OutputKind>().unwrap(),
            OutputKind::Thumbnail
        );
        assert!(matches!(
            "../x".parse::<OutputKind>(),
            Err(Error::RequestInvalid(_))
        ));
    }

    #[test]
    fn merge_container_is_mp4_only_for_mp4_and_any() {
        assert_eq!(OutputKind::Any.merge_output_format(), Some("mp4"));
        assert_eq!(
            OutputKind::Video(VideoContainer::Mp4).merge_output_format(),
            Some("mp4")
        );
        assert_eq!(
            OutputKind::Video(VideoContainer::Webm).merge_output_format(),
            None
        );
        assert_eq!(
            OutputKind::Audio(AudioCodec::Flac).merge_output_format(),
            None
        );
    }

    #[test]
    fn quality_selector_parsing() {
        assert_eq!(QualitySelector::parse("best"), QualitySelector::Best);
        assert_eq!(QualitySelector::parse("worst"), QualitySelector::Worst);
        assert_eq!(QualitySelector::parse("best_ios"), QualitySelector::BestMobile);
        assert_eq!(QualitySelector::parse("720p"), QualitySelector::MaxHeight(720));
        assert_eq!(QualitySelector::parse("p"), QualitySelector::Best);
        assert_eq!(QualitySelector::parse("72]0p"), QualitySelector::Best);
        assert_eq!(QualitySelector::parse("whatever"), QualitySelector::Best);
    }

    #[test]
    fn task_id_validation() {
        assert!(TaskId::parse("client-42_a").is_ok());
        assert!(TaskId::parse("").is_err());
        assert!(TaskId::parse("../../x").is_err());
        assert!(TaskId::parse(&"a".repeat(65)).is_err());
        let generated = TaskId::generate();
        assert!(TaskId::parse(generated.as_str()).is_ok());
    }

    #[test]
    fn request_accepts_legacy_field_names() {
        let request: DownloadRequest = serde_json::from_str(
            r#"{"url":"https://example.test/v","format":"mp3","quality":"worst","strict_mode":true}"#,
        )
        .unwrap();
        assert_eq!(request.output_kind, "mp3");
        assert_eq!(request.quality_selector, "worst");
        assert!(request.strict_single_item);
        assert!(!request.split_into_chapters);
        assert!(request.task_id.is_none());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = Event::Finished {
            id: TaskId::from("t1"),
            filename: "Song.mp3".into(),
            file_size: 42,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "finished");
        assert_eq!(json["id"], "t1");
        assert_eq!(json["file_size"], 42);

        let progress = Event::Progress {
            id: TaskId::from("t1"),
            status: ProgressStatus::Initializing,
            percent: "0%".into(),
            speed: None,
            eta: None,
            filename: None,
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["status"], "initializing");
        assert!(json.get("speed").is_none());
    }
}
