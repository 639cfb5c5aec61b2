//! Finished file handlers: listing, retrieval and deletion.

use super::DeleteResponse;
use crate::api::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// `Content-Disposition` for `filename`, with an ASCII fallback and the
/// RFC 5987 UTF-8 form for non-ASCII titles
fn attachment_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    );

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// GET /api/downloads - List finished files
#[utoipa::path(
    get,
    path = "/api/downloads",
    tag = "files",
    responses(
        (status = 200, description = "Files in the output directory", body = Vec<crate::types::OutputFile>),
        (status = 500, description = "Output directory could not be read", body = crate::error::ApiError)
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Response {
    match state.downloader.list_files().await {
        Ok(files) => (StatusCode::OK, Json(files)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list output directory");
            e.into_response()
        }
    }
}

/// GET /api/download/:filename - Download a finished file
#[utoipa::path(
    get,
    path = "/api/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Name of a file in the output directory")
    ),
    responses(
        (status = 200, description = "File contents as an attachment", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid filename", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError)
    )
)]
pub async fn fetch_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let path = match state.downloader.retrieve(&filename).await {
        Ok(path) => path,
        Err(e) => return e.into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!(file = %filename, error = %e, "Failed to open file for streaming");
            return crate::error::Error::Io(e).into_response();
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_DISPOSITION, attachment_disposition(&filename));
    if let Some(length) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    response
}

/// DELETE /api/downloads/:filename - Delete a finished file
#[utoipa::path(
    delete,
    path = "/api/downloads/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Name of a file in the output directory")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 400, description = "Invalid filename", body = crate::error::ApiError),
        (status = 404, description = "File not found", body = crate::error::ApiError),
        (status = 500, description = "File could not be removed", body = crate::error::ApiError)
    )
)]
pub async fn delete_file(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    match state.downloader.delete(&filename).await {
        Ok(filename) => (
            StatusCode::OK,
            Json(DeleteResponse {
                status: "deleted".to_string(),
                filename,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
