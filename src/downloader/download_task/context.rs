//! Download task context - shared state and helpers for a single task.

use std::sync::Arc;

use crate::broadcaster::Broadcaster;
use crate::config::Config;
use crate::downloader::TaskRegistry;
use crate::downloader::submit::TaskParams;
use crate::extractor::Extractor;
use crate::types::{Event, Phase, ProgressStatus, TaskInfo};

/// Everything one runner needs; cloned pieces of the owning downloader.
pub(crate) struct TaskContext {
    pub(crate) params: TaskParams,
    pub(crate) config: Arc<Config>,
    pub(crate) broadcaster: Broadcaster,
    pub(crate) registry: TaskRegistry,
    pub(crate) extractor: Arc<dyn Extractor>,
}

impl TaskContext {
    pub(super) fn emit(&self, event: Event) {
        self.broadcaster.broadcast(event);
    }

    pub(super) fn emit_progress(
        &self,
        status: ProgressStatus,
        percent: impl Into<String>,
        speed: Option<String>,
        eta: Option<String>,
        filename: Option<String>,
    ) {
        self.emit(Event::Progress {
            id: self.params.id.clone(),
            status,
            percent: percent.into(),
            speed,
            eta,
            filename,
        });
    }

    /// Advance the task record; illegal transitions are logged by the registry.
    pub(super) async fn advance(&self, next: Phase, update: impl FnOnce(&mut TaskInfo)) {
        self.registry.advance(&self.params.id, next, update).await;
    }

    /// Terminal failure: record it, then tell observers.
    pub(super) async fn mark_failed(&self, message: &str) {
        let error = message.to_string();
        self.advance(Phase::Failed, |t| t.error = Some(error)).await;
        self.emit(Event::Error {
            id: self.params.id.clone(),
            url: self.params.url.clone(),
            error: message.to_string(),
        });
    }

    /// Terminal success: record it, then tell observers.
    pub(super) async fn mark_finished(&self, filename: String, file_size: u64) {
        let recorded = filename.clone();
        self.advance(Phase::Finished, |t| {
            t.filename = Some(recorded);
            t.file_size = Some(file_size);
        })
        .await;
        self.emit(Event::Finished {
            id: self.params.id.clone(),
            filename,
            file_size,
        });
    }
}
