//! Task submission handler.

use super::SubmitResponse;
use crate::api::AppState;
use crate::types::DownloadRequest;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /api/downloads - Submit a new download task
///
/// Returns as soon as the task is scheduled. A task that fails later is
/// reported through the event stream, not here.
#[utoipa::path(
    post,
    path = "/api/downloads",
    tag = "downloads",
    request_body = crate::types::DownloadRequest,
    responses(
        (status = 200, description = "Task scheduled", body = SubmitResponse),
        (status = 400, description = "Invalid URL, output kind or task id", body = crate::error::ApiError),
        (status = 409, description = "Task id already in use", body = crate::error::ApiError),
        (status = 503, description = "Service is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn submit_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> Response {
    let url = request.url.trim().to_string();

    match state.downloader.submit(request).await {
        Ok(id) => (
            StatusCode::OK,
            Json(SubmitResponse {
                status: "started".to_string(),
                url,
                id: id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Rejected download request");
            e.into_response()
        }
    }
}
