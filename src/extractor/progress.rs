//! Parsing of yt-dlp progress-template output

use std::sync::LazyLock;

use regex::Regex;

use super::traits::{ToolProgress, ToolStatus};

/// Marker prefixed to every progress line we ask the tool to print
pub(crate) const PROGRESS_MARKER: &str = "MEDIADL_PROGRESS|";

/// `--progress-template` value producing lines understood by [`parse_progress_line`]
pub(crate) const PROGRESS_TEMPLATE: &str = "download:MEDIADL_PROGRESS|%(progress.status)s|%(progress.filename)s|%(progress._percent_str)s|%(progress._speed_str)s|%(progress._eta_str)s";

#[allow(clippy::expect_used)]
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("static ANSI pattern compiles")
});

/// Remove terminal color/control sequences
pub(crate) fn strip_ansi(raw: &str) -> String {
    ANSI_ESCAPE.replace_all(raw, "").into_owned()
}

fn field(raw: &str) -> Option<String> {
    let cleaned = strip_ansi(raw);
    let trimmed = cleaned.trim();
    match trimmed {
        "" | "NA" | "N/A" | "None" | "Unknown" => None,
        value => Some(value.to_string()),
    }
}

/// Parse one stdout line; `None` for anything that is not a progress line
///
/// The filename may itself contain `|`, so the three trailing fields are
/// split from the right.
pub fn parse_progress_line(line: &str) -> Option<ToolProgress> {
    let line = line.trim_end_matches(['\r', '\n']);
    let rest = line.trim_start().strip_prefix(PROGRESS_MARKER)?;

    let mut tail = rest.rsplitn(4, '|');
    let eta = tail.next()?;
    let speed = tail.next()?;
    let percent = tail.next()?;
    let head = tail.next()?;

    let (status, filename) = head.split_once('|')?;

    Some(ToolProgress {
        status: ToolStatus::parse(status.trim()),
        filename: field(filename),
        percent: field(percent),
        speed: field(speed),
        eta: field(eta),
    })
}

/// Numeric value of a percent string such as `" 42.5%"`
pub fn parse_percent(raw: &str) -> Option<f64> {
    let cleaned = strip_ansi(raw);
    let value: f64 = cleaned.trim().trim_end_matches('%').trim().parse().ok()?;
    value.is_finite().then_some(value)
}
