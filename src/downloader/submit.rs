//! Request validation and task scheduling

use std::sync::atomic::Ordering;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::types::{DownloadRequest, OutputKind, Phase, QualitySelector, TaskId, TaskInfo};

use super::MediaDownloader;
use super::download_task::{TaskContext, run_download_task};

/// A request that passed validation
#[derive(Debug, Clone)]
pub(crate) struct TaskParams {
    pub(crate) id: TaskId,
    pub(crate) url: String,
    pub(crate) kind: OutputKind,
    pub(crate) quality: QualitySelector,
    pub(crate) strict_single_item: bool,
    pub(crate) split_into_chapters: bool,
}

impl TaskParams {
    /// Validate a request, adopting the caller's id or generating one
    pub(crate) fn from_request(request: &DownloadRequest) -> Result<Self> {
        let url = validate_url(&request.url)?;
        let kind: OutputKind = request.output_kind.parse()?;
        let id = match request.task_id.as_deref() {
            Some(raw) => TaskId::parse(raw)?,
            None => TaskId::generate(),
        };

        Ok(Self {
            id,
            url,
            kind,
            quality: QualitySelector::parse(&request.quality_selector),
            strict_single_item: request.strict_single_item,
            split_into_chapters: request.split_into_chapters,
        })
    }
}

fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::RequestInvalid("url is required".to_string()));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| Error::RequestInvalid(format!("invalid url '{}': {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(trimmed.to_string()),
        "http" | "https" => Err(Error::RequestInvalid(format!(
            "url '{}' has no host",
            trimmed
        ))),
        other => Err(Error::RequestInvalid(format!(
            "unsupported url scheme '{}'",
            other
        ))),
    }
}

impl MediaDownloader {
    /// Submit a download request
    ///
    /// Validates the request, registers the task as `submitted`, spawns its
    /// runner and returns the task id immediately. Failures after this point
    /// are reported only through an `error` event and the task record.
    ///
    /// # Errors
    ///
    /// - `RequestInvalid` for a malformed URL, unknown output kind or unsafe id
    /// - `Duplicate` if the caller-supplied id is already registered
    /// - `ShuttingDown` once shutdown has begun
    pub async fn submit(&self, request: DownloadRequest) -> Result<TaskId> {
        if !self.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let params = TaskParams::from_request(&request)?;

        self.registry
            .insert(TaskInfo {
                id: params.id.clone(),
                url: params.url.clone(),
                output_kind: params.kind.to_string(),
                quality_selector: request.quality_selector.clone(),
                strict_single_item: params.strict_single_item,
                split_into_chapters: params.split_into_chapters,
                phase: Phase::Submitted,
                title: None,
                filename: None,
                file_size: None,
                error: None,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            task_id = %params.id,
            url = %params.url,
            kind = %params.kind,
            "Task submitted"
        );

        let id = params.id.clone();
        let ctx = TaskContext {
            params,
            config: self.config.clone(),
            broadcaster: self.broadcaster.clone(),
            registry: self.registry.clone(),
            extractor: self.extractor.clone(),
        };
        tokio::spawn(run_download_task(ctx));

        Ok(id)
    }
}
