//! Locating, relocating and cleaning up a task's produced files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{OutputKind, TaskId};
use crate::utils::{sanitize_filename, unique_destination};

/// Extensions probed after the requested kind's own extension
const FALLBACK_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "webm", "m4a", "mp3", "opus", "flac", "wav", "jpg", "webp", "png",
];

/// Basename used when a title sanitizes to nothing
const DEFAULT_STEM: &str = "video";

/// Ordered, duplicate-free list of extensions to probe for `kind`
pub(super) fn candidate_extensions(kind: OutputKind) -> Vec<&'static str> {
    let mut candidates = vec![kind.preferred_extension()];
    for &ext in FALLBACK_EXTENSIONS {
        if !candidates.contains(&ext) {
            candidates.push(ext);
        }
    }
    candidates
}

/// First existing `<dir>/<id>.<ext>` over the candidate list
///
/// Probes only these exact names; other files in the working directory are
/// never considered.
pub(super) async fn locate_artifact(dir: &Path, id: &TaskId, kind: OutputKind) -> Result<PathBuf> {
    for ext in candidate_extensions(kind) {
        let candidate = dir.join(format!("{}.{}", id, ext));
        if tokio::fs::metadata(&candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Ok(candidate);
        }
    }

    Err(Error::ArtifactNotFound {
        id: id.clone(),
        dir: dir.to_path_buf(),
    })
}

/// Final basename stem for a title
pub(super) fn destination_stem(title: &str) -> String {
    let sanitized = sanitize_filename(title);
    let stem = sanitized.trim_end_matches('.');
    if stem.trim().is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// A relocated artifact
#[derive(Debug)]
pub(super) struct Relocated {
    pub(super) path: PathBuf,
    pub(super) filename: String,
    pub(super) file_size: u64,
}

/// Move `artifact` into `output_dir` under the sanitized title
///
/// Rename only; the file is never copied. The size is read before the move.
/// The chosen basename is one retrieval and deletion accept unchanged.
pub(super) async fn relocate(artifact: &Path, output_dir: &Path, title: &str) -> Result<Relocated> {
    let ext = artifact
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let file_size = tokio::fs::metadata(artifact).await?.len();

    let path = unique_destination(output_dir, &destination_stem(title), ext);
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if filename.is_empty() || sanitize_filename(&filename) != filename {
        return Err(Error::PathTraversal {
            requested: filename,
        });
    }

    tokio::fs::rename(artifact, &path).await?;
    Ok(Relocated {
        path,
        filename,
        file_size,
    })
}

/// Remove leftover `<id>.*` files from the working directory
///
/// Errors are logged and otherwise ignored.
pub(super) async fn cleanup_working_files(dir: &Path, id: &TaskId) {
    let prefix = format!("{}.", id);

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(task_id = %id, error = %e, "Failed to read working directory for cleanup");
            return;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(task_id = %id, error = %e, "Failed to list working directory");
                break;
            }
        };

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => tracing::debug!(task_id = %id, file = %name, "Removed working file"),
            Err(e) => {
                tracing::warn!(task_id = %id, file = %name, error = %e, "Failed to remove working file")
            }
        }
    }
}
