//! CLI-based extractor driving an external yt-dlp binary

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::options::{ExtractOptions, FetchMode};
use super::progress::{PROGRESS_TEMPLATE, parse_progress_line, strip_ansi};
use super::traits::{Extractor, MediaMetadata, ProgressSink};
use crate::error::{Error, Result};

/// Extractor backed by the `yt-dlp` executable
///
/// Metadata is read from `-J --skip-download`; progress comes from a
/// `--progress-template` line per sample on stdout (some builds use stderr,
/// both are read).
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::{CliExtractor, Extractor};
/// use std::path::PathBuf;
///
/// // Explicit path
/// let extractor = CliExtractor::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or discover it on PATH
/// let extractor = CliExtractor::from_path().expect("yt-dlp not found in PATH");
/// assert!(extractor.is_available());
/// ```
#[derive(Debug, Clone)]
pub struct CliExtractor {
    binary_path: PathBuf,
}

impl CliExtractor {
    /// Create an extractor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find `yt-dlp` in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path of the executable this extractor runs
    pub fn binary_path(&self) -> &std::path::Path {
        &self.binary_path
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .env("PYTHONIOENCODING", "UTF-8")
            .env("PYTHONUTF8", "1")
            .stdin(Stdio::null());
        command
    }
}

/// Arguments for the metadata-only invocation
pub(crate) fn metadata_args(url: &str, options: &ExtractOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-J".into(),
        "--skip-download".into(),
        "--no-warnings".into(),
        "--no-check-certificates".into(),
    ];
    if options.strict_single_item {
        args.push("--no-playlist".into());
    }
    args.extend(options.extra_args.iter().map(OsString::from));
    args.push("--".into());
    args.push(url.into());
    args
}

/// Arguments for the fetch invocation
pub(crate) fn fetch_args(url: &str, options: &ExtractOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--newline".into(),
        "--progress".into(),
        "--progress-template".into(),
        PROGRESS_TEMPLATE.into(),
        "-o".into(),
        options.output_template.clone().into_os_string(),
        "--continue".into(),
        "--no-check-certificates".into(),
        "--retries".into(),
        options.retries.to_string().into(),
        "--fragment-retries".into(),
        options.fragment_retries.to_string().into(),
        "--concurrent-fragments".into(),
        options.concurrent_fragments.to_string().into(),
    ];

    if options.strict_single_item {
        args.push("--no-playlist".into());
    }

    if options.split_into_chapters {
        let mut chapter = OsString::from("chapter:");
        chapter.push(options.chapter_template.as_os_str());
        args.push("-o".into());
        args.push(chapter);
        args.push("--split-chapters".into());
        args.push("--force-keyframes-at-cuts".into());
    }

    match &options.mode {
        FetchMode::ThumbnailOnly => {
            args.push("--write-thumbnail".into());
            args.push("--skip-download".into());
        }
        FetchMode::Audio { codec, quality } => {
            args.push("-f".into());
            args.push("bestaudio/best".into());
            args.push("--extract-audio".into());
            args.push("--audio-format".into());
            args.push(codec.as_str().into());
            args.push("--audio-quality".into());
            args.push(quality.into());
        }
        FetchMode::Video { format, merge_into } => {
            args.push("-f".into());
            args.push(format.into());
            if let Some(container) = merge_into {
                args.push("--merge-output-format".into());
                args.push((*container).into());
            }
        }
    }

    args.extend(options.extra_args.iter().map(OsString::from));
    args.push("--".into());
    args.push(url.into());
    args
}

/// Read lines lossily (the tool may print non-UTF-8 titles)
fn for_each_line<R: Read>(reader: R, mut handle: impl FnMut(&str)) -> std::io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buffer);
        handle(line.trim_end_matches(['\r', '\n']));
    }
}

fn last_meaningful_line(text: &str) -> Option<String> {
    text.lines()
        .map(|line| strip_ansi(line).trim().to_string())
        .rfind(|line| !line.is_empty())
}

impl Extractor for CliExtractor {
    fn resolve_metadata(&self, url: &str, options: &ExtractOptions) -> Result<MediaMetadata> {
        let output = self
            .command()
            .args(metadata_args(url, options))
            .output()
            .map_err(|e| Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = last_meaningful_line(&stderr)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
            return Err(Error::ExternalTool(message));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::ExternalTool(format!("Failed to parse yt-dlp metadata: {}", e)))
    }

    fn fetch(&self, url: &str, options: &ExtractOptions, sink: &ProgressSink) -> Result<()> {
        let mut child = self
            .command()
            .args(fetch_args(url, options))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::ExternalTool(format!("Failed to start yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ExternalTool("Failed to capture yt-dlp stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ExternalTool("Failed to capture yt-dlp stderr".into()))?;

        let stderr_sink = sink.clone();
        let stderr_reader = std::thread::spawn(move || {
            let mut tail: Option<String> = None;
            let result = for_each_line(stderr, |line| {
                if let Some(sample) = parse_progress_line(line) {
                    stderr_sink.report(sample);
                    return;
                }
                let cleaned = strip_ansi(line);
                let cleaned = cleaned.trim();
                if !cleaned.is_empty() {
                    tail = Some(cleaned.to_string());
                }
            });
            if let Err(e) = result {
                tail = Some(format!("Failed to read yt-dlp stderr: {}", e));
            }
            tail
        });

        let mut last_stdout: Option<String> = None;
        let read_result = for_each_line(stdout, |line| {
            if let Some(sample) = parse_progress_line(line) {
                sink.report(sample);
            } else if !line.trim().is_empty() {
                tracing::trace!(line = %line, "yt-dlp output");
                last_stdout = Some(line.trim().to_string());
            }
        });

        let status = child
            .wait()
            .map_err(|e| Error::ExternalTool(format!("Failed while waiting for yt-dlp: {}", e)))?;
        let stderr_tail = stderr_reader.join().ok().flatten();

        read_result
            .map_err(|e| Error::ExternalTool(format!("Failed to read yt-dlp output: {}", e)))?;

        if !status.success() {
            let message = stderr_tail
                .or(last_stdout)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", status));
            return Err(Error::ExternalTool(message));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    fn is_available(&self) -> bool {
        true
    }
}
