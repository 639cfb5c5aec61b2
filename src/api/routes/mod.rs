//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`downloads`] - Submission of new tasks
//! - [`files`] - Finished files: list, retrieve, delete
//! - [`tasks`] - Task records
//! - [`system`] - Banner, health, capabilities, events, OpenAPI

use serde::{Deserialize, Serialize};

mod downloads;
mod files;
mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` works for the router and OpenAPI doc
pub use downloads::*;
pub use files::*;
pub use system::*;
pub use tasks::*;

// ============================================================================
// Response Types (shared across handlers)
// ============================================================================

/// Response for POST /api/downloads
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    /// Always "started"; the task runs in the background
    pub status: String,
    /// The submitted URL
    pub url: String,
    /// Identifier of the new task
    pub id: String,
}

/// Response for DELETE /api/downloads/:filename
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    /// Always "deleted"
    pub status: String,
    /// The name that was removed
    pub filename: String,
}
