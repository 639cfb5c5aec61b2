//! Task record handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::types::TaskId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// GET /api/tasks - List all task records
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = "tasks",
    responses(
        (status = 200, description = "Every task submitted since startup, oldest first", body = Vec<crate::types::TaskInfo>)
    )
)]
pub async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.downloader.tasks().await))
}

/// GET /api/tasks/:id - Get one task record
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task record", body = crate::types::TaskInfo),
        (status = 400, description = "Malformed task ID", body = crate::error::ApiError),
        (status = 404, description = "Task not found", body = crate::error::ApiError)
    )
)]
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match TaskId::parse(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match state.downloader.task(&id).await {
        Some(info) => (StatusCode::OK, Json(info)).into_response(),
        None => Error::NotFound(format!("task {}", id)).into_response(),
    }
}
