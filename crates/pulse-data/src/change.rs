//! Period-over-period percent change.

use std::fmt;

use serde::{Serialize, Serializer};

/// Percent change between two periods.
///
/// Positive infinity stands for growth from a zero baseline. Serializes as
/// its display string since JSON has no infinity.
///
/// # Examples
///
/// ```
/// use pulse_data::change::percent_change;
///
/// assert_eq!(percent_change(150, 100).to_string(), "+50.0%");
/// assert_eq!(percent_change(50, 100).to_string(), "-50.0%");
/// assert_eq!(percent_change(10, 0).to_string(), "+∞%");
/// assert_eq!(percent_change(0, 0).to_string(), "0%");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentChange(f64);

impl PercentChange {
    /// The raw percentage; `f64::INFINITY` for growth from zero.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` when the previous period was zero and the current was not.
    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }
}

/// Compute `((current - previous) / previous) * 100`.
///
/// Defined as positive infinity when `previous` is zero and `current` is
/// not, and as zero when both are zero.
pub fn percent_change(current: i64, previous: i64) -> PercentChange {
    if previous == 0 {
        return PercentChange(if current != 0 { f64::INFINITY } else { 0.0 });
    }
    let (current, previous) = (current as f64, previous as f64);
    PercentChange((current - previous) / previous * 100.0)
}

/// Render a percentage the way the dashboard shows it.
///
/// Infinity renders as `+∞%`, zero as `0%`, anything else as a signed
/// one-decimal percentage.
///
/// # Examples
///
/// ```
/// use pulse_data::change::format_percent;
///
/// assert_eq!(format_percent(f64::INFINITY), "+∞%");
/// assert_eq!(format_percent(0.0), "0%");
/// assert_eq!(format_percent(12.345), "+12.3%");
/// assert_eq!(format_percent(-4.0), "-4.0%");
/// ```
pub fn format_percent(percent: f64) -> String {
    if percent == f64::INFINITY {
        "+∞%".into()
    } else if percent == 0.0 {
        "0%".into()
    } else if percent > 0.0 {
        format!("+{percent:.1}%")
    } else {
        format!("{percent:.1}%")
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_percent(self.0))
    }
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
