//! Listing, retrieval and deletion of finished artifacts.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::types::OutputFile;
use crate::utils::{resolve_in_dir, sanitize_filename};

use super::MediaDownloader;

impl MediaDownloader {
    /// Sanitize and validate a caller-supplied filename
    ///
    /// Every name the service produces is already sanitized, so a name that
    /// changes under sanitizing is refused outright.
    fn checked_output_path(&self, name: &str) -> Result<(String, PathBuf)> {
        if name.trim().is_empty() {
            return Err(Error::RequestInvalid("filename must not be empty".to_string()));
        }

        let sanitized = sanitize_filename(name);
        if sanitized != name {
            tracing::warn!(requested = %name, "Rejected filename altered by sanitizing");
            return Err(Error::PathTraversal {
                requested: name.to_string(),
            });
        }

        let path = resolve_in_dir(&self.config.download.download_dir, &sanitized)?;
        Ok((sanitized, path))
    }

    /// Finished files in the output directory, sorted by name
    pub async fn list_files(&self) -> Result<Vec<OutputFile>> {
        let mut entries = tokio::fs::read_dir(&self.config.download.download_dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(file = ?entry.file_name(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };

            files.push(OutputFile {
                filename,
                size_bytes: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    /// Resolve a finished file for download
    ///
    /// # Errors
    ///
    /// `RequestInvalid`/`PathTraversal` for unsafe names, `NotFound` if no such
    /// file exists in the output directory.
    pub async fn retrieve(&self, name: &str) -> Result<PathBuf> {
        let (sanitized, path) = self.checked_output_path(name)?;

        match tokio::fs::metadata(&path).await {
            Ok(m) if m.is_file() => Ok(path),
            Ok(_) => Err(Error::NotFound(sanitized)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(sanitized)),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Delete a finished file; returns the name that was removed
    ///
    /// # Errors
    ///
    /// Same validation as [`MediaDownloader::retrieve`]; `Io` if removal fails.
    pub async fn delete(&self, name: &str) -> Result<String> {
        let (sanitized, path) = self.checked_output_path(name)?;

        match tokio::fs::symlink_metadata(&path).await {
            Ok(m) if m.is_file() => {}
            Ok(_) => return Err(Error::NotFound(sanitized)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(sanitized));
            }
            Err(e) => return Err(Error::Io(e)),
        }

        tokio::fs::remove_file(&path).await.map_err(|e| {
            tracing::error!(file = %sanitized, error = %e, "Failed to delete file");
            Error::Io(e)
        })?;

        tracing::info!(file = %sanitized, "Deleted file");
        Ok(sanitized)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use crate::downloader::test_helpers::{FakeExtractor, create_test_downloader};
    use crate::error::Error;

    #[tokio::test]
    async fn list_retrieve_delete_round_trip() {
        let (downloader, _temp) = create_test_downloader(FakeExtractor::new("t")).await;
        let out = downloader.config.download.download_dir.clone();
        std::fs::write(out.join("b.mp4"), b"video").unwrap();
        std::fs::write(out.join("a.mp3"), b"au").unwrap();
        std::fs::create_dir(out.join("subdir")).unwrap();

        let files = downloader.list_files().await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["a.mp3", "b.mp4"]);
        assert_eq!(files[1].size_bytes, 5);

        let path = downloader.retrieve("b.mp4").await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"video");

        assert_eq!(downloader.delete("b.mp4").await.unwrap(), "b.mp4");
        assert!(!out.join("b.mp4").exists());
        assert!(matches!(
            downloader.retrieve("b.mp4").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_is_invalid_not_missing() {
        let (downloader, temp) = create_test_downloader(FakeExtractor::new("t")).await;
        std::fs::write(temp.path().join("secret.txt"), b"s").unwrap();

        for name in ["../secret.txt", "../../etc/passwd", "a/b", "..", "x:y"] {
            assert!(
                matches!(
                    downloader.retrieve(name).await,
                    Err(Error::PathTraversal { .. })
                ),
                "retrieve {name:?}"
            );
            assert!(
                matches!(
                    downloader.delete(name).await,
                    Err(Error::PathTraversal { .. })
                ),
                "delete {name:?}"
            );
        }
        assert!(temp.path().join("secret.txt").exists());
    }

    #[tokio::test]
    async fn missing_and_empty_names() {
        let (downloader, _temp) = create_test_downloader(FakeExtractor::new("t")).await;
        assert!(matches!(
            downloader.delete("ghost.mp4").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            downloader.retrieve("").await,
            Err(Error::RequestInvalid(_))
        ));
    }
}
