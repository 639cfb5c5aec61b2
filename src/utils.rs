//! Utility functions for filename sanitizing and path validation

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Maximum length, in characters, of a sanitized filename
pub const MAX_FILENAME_CHARS: usize = 200;

/// Characters never allowed in a produced or requested filename
const FORBIDDEN_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Turn an arbitrary string into a filesystem-safe, traversal-free filename
///
/// Strips path separators and shell/Windows-reserved characters, removes every
/// `..` (repeatedly, so the result never contains one) and truncates to
/// [`MAX_FILENAME_CHARS`] characters. The result may be empty.
///
/// # Examples
///
/// ```
/// use media_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("My/Video: Part 1?"), "MyVideo Part 1");
/// assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
/// ```
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let mut cleaned: String = raw.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect();

    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", "");
    }

    match cleaned.char_indices().nth(MAX_FILENAME_CHARS) {
        Some((byte_idx, _)) => cleaned[..byte_idx].to_string(),
        None => cleaned,
    }
}

/// Normalize `.` and `..` components without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve `name` inside `dir`, refusing anything that escapes it
///
/// The check is component-wise on the lexically normalized absolute paths, so
/// `/srv/downloads-evil` is not accepted as being inside `/srv/downloads`. The
/// directory itself is not a valid target. When the target already exists its
/// canonical path is checked as well, which catches symlinks pointing outside.
///
/// Does not sanitize: `../x` is rejected here even if nobody sanitized it first.
pub fn resolve_in_dir(dir: &Path, name: &str) -> Result<PathBuf> {
    let base = normalize_lexically(&std::path::absolute(dir)?);
    let candidate = normalize_lexically(&base.join(name));

    if candidate == base || !candidate.starts_with(&base) {
        tracing::warn!(
            requested = %name,
            dir = %base.display(),
            "Rejected path outside output directory"
        );
        return Err(Error::PathTraversal {
            requested: name.to_string(),
        });
    }

    if candidate.symlink_metadata().is_ok() {
        let real_base = std::fs::canonicalize(&base)?;
        let real_candidate = std::fs::canonicalize(&candidate)?;
        if real_candidate == real_base || !real_candidate.starts_with(&real_base) {
            tracing::warn!(
                requested = %name,
                target = %real_candidate.display(),
                "Rejected link resolving outside output directory"
            );
            return Err(Error::PathTraversal {
                requested: name.to_string(),
            });
        }
    }

    Ok(candidate)
}

/// `<stem><suffix>.<ext>`, shortened to at most [`MAX_FILENAME_CHARS`] characters
///
/// Only the stem is cut. Trailing dots are stripped from it so the joined name
/// never contains `..`; for a sanitized stem the result sanitizes to itself.
#[must_use]
pub fn fit_filename(stem: &str, suffix: &str, ext: &str) -> String {
    let reserved = suffix.chars().count() + ext.chars().count() + 1;
    let budget = MAX_FILENAME_CHARS.saturating_sub(reserved);
    let truncated: String = stem.chars().take(budget).collect();
    format!("{}{suffix}.{ext}", truncated.trim_end_matches('.'))
}

/// Pick a destination for `<stem>.<ext>` in `dir` that does not exist yet
///
/// On collision the current unix time is appended to the stem
/// (`<stem>_<secs>.<ext>`); if that is taken too a counter follows. Every
/// candidate goes through [`fit_filename`].
/// The check and the later rename are not atomic together.
#[must_use]
pub fn unique_destination(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let preferred = dir.join(fit_filename(stem, "", ext));
    if !preferred.exists() {
        return preferred;
    }

    let secs = chrono::Utc::now().timestamp();
    let stamped = dir.join(fit_filename(stem, &format!("_{secs}"), ext));
    if !stamped.exists() {
        return stamped;
    }

    let mut counter = 1u32;
    loop {
        let candidate = dir.join(fit_filename(stem, &format!("_{secs}_{counter}"), ext));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
