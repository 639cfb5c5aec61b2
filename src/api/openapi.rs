//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "Submit media downloads, follow their progress over server-sent events, and manage the finished files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Submission
        crate::api::routes::submit_download,

        // Finished files
        crate::api::routes::list_files,
        crate::api::routes::fetch_file,
        crate::api::routes::delete_file,

        // Tasks
        crate::api::routes::list_tasks,
        crate::api::routes::get_task,

        // System
        crate::api::routes::root,
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(
        schemas(
            crate::types::TaskId,
            crate::types::DownloadRequest,
            crate::types::Phase,
            crate::types::ProgressStatus,
            crate::types::Event,
            crate::types::TaskInfo,
            crate::types::OutputFile,
            crate::types::Capabilities,
            crate::api::routes::SubmitResponse,
            crate::api::routes::DeleteResponse,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "downloads", description = "Task submission"),
        (name = "files", description = "Finished files in the output directory"),
        (name = "tasks", description = "Task records and lifecycle phases"),
        (name = "system", description = "Health, capabilities, event stream and API documentation"),
    )
)]
pub struct ApiDoc;
