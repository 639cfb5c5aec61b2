//! Configuration types for media-dl

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Main configuration for [`crate::MediaDownloader`]
///
/// Every section and field has a default, so `Config::default()` and an
/// empty JSON object `{}` describe the same service.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Directories and task timing
    #[serde(default)]
    pub download: DownloadConfig,

    /// Extraction tool location and fetch policy
    #[serde(default)]
    pub tools: ToolsConfig,

    /// HTTP surface
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Reject settings that would make every task fail
    pub fn validate(&self) -> Result<()> {
        if self.download.download_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "download_dir must not be empty".to_string(),
                key: Some("download.download_dir".to_string()),
            });
        }
        if self.download.processing_dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "processing_dir must not be empty".to_string(),
                key: Some("download.processing_dir".to_string()),
            });
        }
        if self.download.event_buffer == 0 {
            return Err(Error::Config {
                message: "event_buffer must be at least 1".to_string(),
                key: Some("download.event_buffer".to_string()),
            });
        }
        if self.tools.concurrent_fragments == 0 {
            return Err(Error::Config {
                message: "concurrent_fragments must be at least 1".to_string(),
                key: Some("tools.concurrent_fragments".to_string()),
            });
        }
        Ok(())
    }
}

/// Directory layout and task timing
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Output directory for finished artifacts (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Working directory for in-flight tasks (default: "./processing")
    #[serde(default = "default_processing_dir")]
    pub processing_dir: PathBuf,

    /// Pause between the end of the fetch and the artifact probe (default: 2 seconds)
    ///
    /// Gives the tool's post-processors time to release the final file.
    #[serde(default = "default_settle_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub settle_delay: Duration,

    /// Per-observer event buffer; slower observers skip events (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            processing_dir: default_processing_dir(),
            settle_delay: default_settle_delay(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// Extraction tool settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Retries per request (default: 10)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Retries per fragment (default: 10)
    #[serde(default = "default_retries")]
    pub fragment_retries: u32,

    /// Fragments fetched in parallel (default: 5)
    #[serde(default = "default_concurrent_fragments")]
    pub concurrent_fragments: u32,

    /// Audio extraction quality (default: "192K")
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,

    /// Extra arguments appended to every yt-dlp invocation
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            retries: default_retries(),
            fragment_retries: default_retries(),
            concurrent_fragments: default_concurrent_fragments(),
            audio_quality: default_audio_quality(),
            extra_args: Vec::new(),
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_processing_dir() -> PathBuf {
    PathBuf::from("./processing")
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_event_buffer() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    10
}

fn default_concurrent_fragments() -> u32 {
    5
}

fn default_audio_quality() -> String {
    "192K".to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Durations are written as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
