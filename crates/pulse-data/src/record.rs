//! Typed rows produced by the loader.

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use chrono::NaiveDate;
use pulse_core::{PulseError, SortKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel week value marking cumulative all-time rows.
pub const ALLTIME: &str = "alltime";

/// Fixed string format weeks are re-serialized to.
pub const WEEK_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: [&str; 3] = [WEEK_FORMAT, "%Y/%m/%d", "%m/%d/%Y"];

/// The week a row belongs to: a calendar date or the `alltime` sentinel.
///
/// # Examples
///
/// ```
/// use pulse_data::record::Week;
///
/// let week: Week = "2024-03-04".parse().unwrap();
/// assert_eq!(week.to_string(), "2024-03-04");
///
/// let total: Week = "AllTime".parse().unwrap();
/// assert!(total.is_alltime());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Week {
    /// Cumulative totals rather than a calendar week.
    AllTime,
    /// A calendar week identified by its date.
    Date(NaiveDate),
}

impl Week {
    /// Returns `true` for the `alltime` sentinel.
    pub fn is_alltime(self) -> bool {
        matches!(self, Week::AllTime)
    }

    /// The calendar date, or `None` for the sentinel.
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Week::AllTime => None,
            Week::Date(date) => Some(date),
        }
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::AllTime => write!(f, "{ALLTIME}"),
            Week::Date(date) => write!(f, "{}", date.format(WEEK_FORMAT)),
        }
    }
}

impl FromStr for Week {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(ALLTIME) {
            return Ok(Week::AllTime);
        }
        parse_date(s)
            .map(Week::Date)
            .ok_or_else(|| PulseError::Parse(format!("invalid week {s:?}")))
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    // ISO timestamps: keep the date part only
    match s.as_bytes().get(10) {
        Some(b'T') | Some(b' ') => NaiveDate::parse_from_str(&s[..10], WEEK_FORMAT).ok(),
        _ => None,
    }
}

impl Serialize for Week {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Summed views, likes and follower growth.
///
/// # Examples
///
/// ```
/// use pulse_data::record::MetricTotals;
///
/// let mut total = MetricTotals::default();
/// total += MetricTotals { views: 10, likes: 2, follower_growth: -1 };
/// total += MetricTotals { views: 5, likes: 1, follower_growth: 3 };
/// assert_eq!(total, MetricTotals { views: 15, likes: 3, follower_growth: 2 });
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTotals {
    /// Total views.
    pub views: i64,
    /// Total likes.
    pub likes: i64,
    /// Net follower change.
    pub follower_growth: i64,
}

impl AddAssign for MetricTotals {
    fn add_assign(&mut self, rhs: Self) {
        // Cells coerce up to i64::MAX, so sums clamp rather than overflow.
        self.views = self.views.saturating_add(rhs.views);
        self.likes = self.likes.saturating_add(rhs.likes);
        self.follower_growth = self.follower_growth.saturating_add(rhs.follower_growth);
    }
}

/// One row of the weekly performance export.
///
/// # Examples
///
/// ```
/// use pulse_data::record::{PerformanceRecord, Week};
///
/// let row = PerformanceRecord {
///     week: Week::AllTime,
///     platform: "tiktok".into(),
///     views: 120_000,
///     likes: 9_000,
///     follower_growth: 450,
/// };
/// assert!(row.week.is_alltime());
/// assert_eq!(row.totals().views, 120_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    /// Calendar week or the `alltime` sentinel.
    pub week: Week,
    /// Social media channel.
    pub platform: String,
    /// Views in the week.
    pub views: i64,
    /// Likes in the week.
    pub likes: i64,
    /// Net follower change in the week.
    pub follower_growth: i64,
}

impl PerformanceRecord {
    /// The row's metrics as a [`MetricTotals`].
    pub fn totals(&self) -> MetricTotals {
        MetricTotals {
            views: self.views,
            likes: self.likes,
            follower_growth: self.follower_growth,
        }
    }
}

/// One ranked post from the top posts export.
///
/// # Examples
///
/// ```
/// use pulse_core::SortKey;
/// use pulse_data::record::TopPost;
///
/// let post = TopPost {
///     rank: 1,
///     week: None,
///     post_type: "Reel".into(),
///     link: "https://example.com/p/1".into(),
///     views: 52_000,
///     engagement: 3_100,
/// };
/// assert_eq!(post.metric(SortKey::Engagement), 3_100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPost {
    /// 1-based position in file order (within its week when weeks are present).
    pub rank: usize,
    /// Week the post belongs to, when the file carries a `week` column.
    pub week: Option<Week>,
    /// Category label, e.g. "Reel" or "Carousel".
    pub post_type: String,
    /// URL of the post.
    pub link: String,
    /// View count.
    pub views: i64,
    /// Engagement count.
    pub engagement: i64,
}

impl TopPost {
    /// Value of the column selected by `key`.
    pub fn metric(&self, key: SortKey) -> i64 {
        match key {
            SortKey::Views => self.views,
            SortKey::Engagement => self.engagement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut total = MetricTotals {
            views: i64::MAX,
            likes: 1,
            follower_growth: i64::MIN,
        };
        total += MetricTotals {
            views: i64::MAX,
            likes: 2,
            follower_growth: -5,
        };
        assert_eq!(total.views, i64::MAX);
        assert_eq!(total.likes, 3);
        assert_eq!(total.follower_growth, i64::MIN);
    }

    #[test]
    fn week_parses_supported_date_formats() {
        let expected = Week::Date(date(2024, 3, 4));
        assert_eq!("2024-03-04".parse::<Week>().unwrap(), expected);
        assert_eq!("2024/03/04".parse::<Week>().unwrap(), expected);
        assert_eq!("03/04/2024".parse::<Week>().unwrap(), expected);
        assert_eq!("2024-03-04T00:00:00".parse::<Week>().unwrap(), expected);
        assert_eq!("2024-03-04 00:00:00".parse::<Week>().unwrap(), expected);
        assert_eq!(" 2024-03-04 ".parse::<Week>().unwrap(), expected);
    }

    #[test]
    fn week_sentinel_is_case_insensitive() {
        assert_eq!("alltime".parse::<Week>().unwrap(), Week::AllTime);
        assert_eq!("ALLTIME".parse::<Week>().unwrap(), Week::AllTime);
    }

    #[test]
    fn week_rejects_garbage() {
        let err = "last week".parse::<Week>().unwrap_err();
        assert!(err.to_string().contains("last week"));
        assert!("2024-13-01".parse::<Week>().is_err());
        assert!("".parse::<Week>().is_err());
    }

    #[test]
    fn week_serializes_as_string() {
        let json = serde_json::to_string(&Week::Date(date(2024, 1, 7))).unwrap();
        assert_eq!(json, "\"2024-01-07\"");
        assert_eq!(serde_json::to_string(&Week::AllTime).unwrap(), "\"alltime\"");

        let parsed: Week = serde_json::from_str("\"alltime\"").unwrap();
        assert_eq!(parsed, Week::AllTime);
    }

    #[test]
    fn calendar_weeks_order_chronologically() {
        let earlier = Week::Date(date(2023, 12, 31));
        let later = Week::Date(date(2024, 1, 7));
        assert!(earlier < later);
        assert_eq!(later.date(), Some(date(2024, 1, 7)));
        assert_eq!(Week::AllTime.date(), None);
    }

    #[test]
    fn record_serializes_camel_case() {
        let row = PerformanceRecord {
            week: Week::AllTime,
            platform: "x".into(),
            views: 1,
            likes: 2,
            follower_growth: 3,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["followerGrowth"], 3);
        assert!(json.get("follower_growth").is_none());
    }
}
