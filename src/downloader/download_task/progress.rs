//! Percent normalization for tool progress samples.

use crate::extractor::parse_percent;

/// Percent shown while the artifact is being finalized, unless already higher
const MERGING_PERCENT: f64 = 99.0;

/// Keeps the percent sequence seen by observers within [0, 100] and non-decreasing
///
/// Separate video and audio streams each restart at 0%; samples from the
/// second stream that fall below the high-water mark are suppressed.
#[derive(Debug, Default)]
pub(super) struct PercentTracker {
    high_water: Option<f64>,
}

impl PercentTracker {
    /// Percent to publish for a sample, or `None` to drop the sample
    ///
    /// Samples without a readable percent carry the current high-water mark.
    pub(super) fn observe(&mut self, raw: Option<&str>) -> Option<String> {
        let Some(value) = raw.and_then(parse_percent) else {
            return Some(format_percent(self.high_water.unwrap_or(0.0)));
        };

        let clamped = value.clamp(0.0, 100.0);
        match self.high_water {
            Some(high) if clamped < high => None,
            _ => {
                self.high_water = Some(clamped);
                Some(format_percent(clamped))
            }
        }
    }

    /// Percent for the `merging` event
    pub(super) fn merging_percent(&self) -> String {
        format_percent(self.high_water.unwrap_or(0.0).max(MERGING_PERCENT))
    }
}

/// "42.5%" with one decimal, whole numbers without ("99%")
pub(super) fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}
