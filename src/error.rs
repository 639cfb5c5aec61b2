//! Error types for media-dl
//!
//! This module provides error handling for the library, including:
//! - The domain error enum used by the downloader and the task runner
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::TaskId;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
///
/// Synchronous failures (malformed submissions, path validation) are returned
/// to the caller. Failures inside a running task never escape the task; they
/// are reported through an `error` event instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed submission or retrieval request
    #[error("invalid request: {0}")]
    RequestInvalid(String),

    /// A requested filename resolved outside the output directory
    #[error("invalid filename: {requested}")]
    PathTraversal {
        /// The filename as supplied by the caller
        requested: String,
    },

    /// A task with the same identifier is already registered
    #[error("duplicate task: {0}")]
    Duplicate(String),

    /// Task or file not found
    #[error("not found: {0}")]
    NotFound(String),

    /// The extraction tool failed (network error, unsupported URL, transcode failure)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Post-processing produced no recognizable file
    #[error("could not find downloaded file for task {id} in {dir}")]
    ArtifactNotFound {
        /// The task whose artifact is missing
        id: TaskId,
        /// The working directory that was probed
        dir: PathBuf,
    },

    /// I/O error (move, delete, metadata)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download_dir")
        key: Option<String>,
    },

    /// Operation not supported (missing binary)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new tasks
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "not found: movie.mp4"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_request")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - rejected before anything runs
            Error::RequestInvalid(_) => 400,
            Error::PathTraversal { .. } => 400,

            // 409 Conflict
            Error::Duplicate(_) => 409,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 502 Bad Gateway - the extraction tool talks to remote sites
            Error::ExternalTool(_) => 502,

            // 501 Not Implemented - binary missing
            Error::NotSupported(_) => 501,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 500 Internal Server Error
            Error::ArtifactNotFound { .. } => 500,
            Error::Io(_) => 500,
            Error::Config { .. } => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::RequestInvalid(_) => "invalid_request",
            Error::PathTraversal { .. } => "invalid_filename",
            Error::Duplicate(_) => "duplicate_task",
            Error::NotFound(_) => "not_found",
            Error::ExternalTool(_) => "external_tool_error",
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::Io(_) => "io_error",
            Error::Config { .. } => "config_error",
            Error::NotSupported(_) => "not_supported",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::ArtifactNotFound { id, dir } => Some(serde_json::json!({
                "task_id": id,
                "dir": dir,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
