//! Download task orchestration - top-level lifecycle for a single task.

use std::path::Path;

use crate::error::{Error, Result};
use crate::extractor::{ExtractOptions, ProgressSink, TaskOptions, ToolStatus};
use crate::types::{Phase, ProgressStatus};

use super::artifact::{cleanup_working_files, locate_artifact, relocate};
use super::context::TaskContext;
use super::progress::PercentTracker;

/// Title used when the source reports none
const DEFAULT_TITLE: &str = "video";

/// Outcome of a successful run.
struct Finished {
    filename: String,
    file_size: u64,
}

/// Where a run stopped. Working files are removed only for failures before the move.
enum Failure {
    BeforeMove(Error),
    Move(Error),
}

/// Run a blocking extractor call on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::ExternalTool(format!("extraction worker failed: {}", e)))?
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Core task runner -- drives one task from `submitted` to a terminal phase.
///
/// Phases:
/// 1. Announce start (`initializing`)
/// 2. Resolve the title (`starting`)
/// 3. Fetch, forwarding tool progress (`downloading`)
/// 4. Announce finalization (`merging`), settle, locate the artifact
/// 5. Move it into the output directory (`finished`)
///
/// Never returns an error: every failure ends as an `error` event.
pub(crate) async fn run_download_task(ctx: TaskContext) {
    let id = ctx.params.id.clone();
    let processing_dir = ctx.config.download.processing_dir.clone();

    match execute(&ctx).await {
        Ok(done) => {
            tracing::info!(
                task_id = %id,
                filename = %done.filename,
                file_size = done.file_size,
                "Task finished"
            );
            cleanup_working_files(&processing_dir, &id).await;
            ctx.mark_finished(done.filename, done.file_size).await;
        }
        Err(Failure::BeforeMove(e)) => {
            tracing::warn!(task_id = %id, url = %ctx.params.url, error = %e, "Task failed");
            cleanup_working_files(&processing_dir, &id).await;
            ctx.mark_failed(&e.to_string()).await;
        }
        Err(Failure::Move(e)) => {
            tracing::error!(
                task_id = %id,
                error = %e,
                "Failed to move artifact into output directory; working file left in place"
            );
            ctx.mark_failed(&e.to_string()).await;
        }
    }
}

async fn execute(ctx: &TaskContext) -> std::result::Result<Finished, Failure> {
    let params = &ctx.params;
    let config = &ctx.config;

    // Phase 1: announce before any network I/O
    ctx.advance(Phase::Initializing, |_| {}).await;
    ctx.emit_progress(
        ProgressStatus::Initializing,
        "0%",
        Some("Connecting...".to_string()),
        Some("Preparing...".to_string()),
        None,
    );

    let options = ExtractOptions::for_task(
        TaskOptions {
            id: &params.id,
            processing_dir: &config.download.processing_dir,
            kind: params.kind,
            quality: params.quality,
            strict_single_item: params.strict_single_item,
            split_into_chapters: params.split_into_chapters,
        },
        &config.tools,
    );

    // Phase 2: metadata only
    let metadata = {
        let extractor = ctx.extractor.clone();
        let url = params.url.clone();
        let options = options.clone();
        run_blocking(move || extractor.resolve_metadata(&url, &options))
            .await
            .map_err(Failure::BeforeMove)?
    };
    let title = metadata
        .title
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    tracing::debug!(task_id = %params.id, title = %title, "Metadata resolved");

    let recorded = title.clone();
    ctx.advance(Phase::MetadataResolved, |t| t.title = Some(recorded))
        .await;
    ctx.emit_progress(
        ProgressStatus::Starting,
        "0%",
        None,
        None,
        Some(title.clone()),
    );

    // Phase 3: fetch on the blocking pool, samples come back over the channel
    ctx.advance(Phase::Downloading, |_| {}).await;
    let (sink, mut samples) = ProgressSink::channel();
    let worker = {
        let extractor = ctx.extractor.clone();
        let url = params.url.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || extractor.fetch(&url, &options, &sink))
    };

    let mut tracker = PercentTracker::default();
    while let Some(sample) = samples.recv().await {
        if sample.status != ToolStatus::Downloading {
            continue;
        }
        if let Some(percent) = tracker.observe(sample.percent.as_deref()) {
            ctx.emit_progress(
                ProgressStatus::Downloading,
                percent,
                sample.speed,
                sample.eta,
                sample.filename.as_deref().map(basename),
            );
        }
    }

    worker
        .await
        .map_err(|e| Error::ExternalTool(format!("extraction worker failed: {}", e)))
        .and_then(|fetched| fetched)
        .map_err(Failure::BeforeMove)?;

    // Phase 4: finalize
    ctx.advance(Phase::Finalizing, |_| {}).await;
    ctx.emit_progress(
        ProgressStatus::Merging,
        tracker.merging_percent(),
        Some("Processing".to_string()),
        Some("Finalizing...".to_string()),
        None,
    );
    tokio::time::sleep(config.download.settle_delay).await;

    let artifact = locate_artifact(&config.download.processing_dir, &params.id, params.kind)
        .await
        .map_err(Failure::BeforeMove)?;

    // Phase 5: move into the output directory
    let moved = relocate(&artifact, &config.download.download_dir, &title)
        .await
        .map_err(Failure::Move)?;
    tracing::debug!(task_id = %params.id, path = %moved.path.display(), "Artifact moved");

    Ok(Finished {
        filename: moved.filename,
        file_size: moved.file_size,
    })
}
