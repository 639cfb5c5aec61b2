//! Extraction engine seam
//!
//! The task runner never talks to yt-dlp directly; it goes through the
//! [`Extractor`] trait. Implementations:
//!
//! - [`CliExtractor`]: runs the external `yt-dlp` binary
//! - [`UnavailableExtractor`]: used when no binary is found; every call fails
//!   with `NotSupported`
//!
//! [`ExtractOptions`] turns a task's output kind, quality selector and policy
//! flags into the concrete fetch mode (format selection, audio extraction,
//! thumbnail only).

mod cli;
mod noop;
mod options;
mod progress;
mod traits;

pub use cli::CliExtractor;
pub use noop::UnavailableExtractor;
pub use options::{ExtractOptions, FetchMode, TaskOptions, format_selector};
pub use progress::{parse_percent, parse_progress_line};
pub use traits::{Extractor, MediaMetadata, ProgressSink, ToolProgress, ToolStatus};
