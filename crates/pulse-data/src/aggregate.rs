//! Totals, breakdowns, trends and rankings over loaded records.
//!
//! Every function here is a filter → group → sum pass over the in-memory
//! rows. Weekly aggregates only look at calendar weeks; the `alltime`
//! sentinel rows are reachable through [`Partition::AllTime`] only.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use pulse_core::SortKey;
use serde::Serialize;

use crate::change::{percent_change, PercentChange};
use crate::record::{MetricTotals, PerformanceRecord, TopPost, Week, WEEK_FORMAT};

/// Which side of the `alltime` sentinel to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// Cumulative rows whose week is `alltime`.
    AllTime,
    /// Per-week rows with a calendar date.
    Weekly,
}

impl Partition {
    fn contains(self, week: Week) -> bool {
        match self {
            Partition::AllTime => week.is_alltime(),
            Partition::Weekly => !week.is_alltime(),
        }
    }
}

/// Per-platform sums over the weekly partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTotals {
    /// Social media channel.
    pub platform: String,
    /// Summed metrics.
    #[serde(flatten)]
    pub totals: MetricTotals,
}

/// One point of a trend series: a platform's sums for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Week formatted as `YYYY-MM-DD`.
    pub week: String,
    /// Social media channel.
    pub platform: String,
    /// Summed metrics.
    #[serde(flatten)]
    pub totals: MetricTotals,
}

/// Percent change of each metric between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricChanges {
    /// Change in views.
    pub views: PercentChange,
    /// Change in likes.
    pub likes: PercentChange,
    /// Change in follower growth.
    pub follower_growth: PercentChange,
}

impl MetricChanges {
    /// Changes going from `previous` to `current`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_data::aggregate::MetricChanges;
    /// use pulse_data::record::MetricTotals;
    ///
    /// let current = MetricTotals { views: 150, likes: 0, follower_growth: 4 };
    /// let previous = MetricTotals { views: 100, likes: 0, follower_growth: 0 };
    /// let changes = MetricChanges::between(&current, &previous);
    /// assert_eq!(changes.views.to_string(), "+50.0%");
    /// assert_eq!(changes.likes.to_string(), "0%");
    /// assert_eq!(changes.follower_growth.to_string(), "+∞%");
    /// ```
    pub fn between(current: &MetricTotals, previous: &MetricTotals) -> Self {
        Self {
            views: percent_change(current.views, previous.views),
            likes: percent_change(current.likes, previous.likes),
            follower_growth: percent_change(current.follower_growth, previous.follower_growth),
        }
    }
}

/// The latest calendar week next to the week before it.
///
/// `previous` and `changes` are `None` when there is no earlier week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekComparison {
    /// Most recent week.
    pub current_week: NaiveDate,
    /// Week compared against.
    pub previous_week: Option<NaiveDate>,
    /// Sums for the most recent week.
    pub current: MetricTotals,
    /// Sums for the previous week.
    pub previous: Option<MetricTotals>,
    /// Percent change per metric.
    pub changes: Option<MetricChanges>,
}

impl WeekComparison {
    fn new(
        current_week: NaiveDate,
        current: MetricTotals,
        previous: Option<(NaiveDate, MetricTotals)>,
    ) -> Self {
        Self {
            current_week,
            previous_week: previous.map(|(week, _)| week),
            current,
            previous: previous.map(|(_, totals)| totals),
            changes: previous.map(|(_, totals)| MetricChanges::between(&current, &totals)),
        }
    }
}

/// A platform's latest week compared with its own previous week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDelta {
    /// Social media channel.
    pub platform: String,
    /// Current vs. previous week for this platform.
    #[serde(flatten)]
    pub comparison: WeekComparison,
}

/// Sum the metrics of one partition.
///
/// # Examples
///
/// ```
/// use pulse_data::aggregate::{summary_metrics, Partition};
/// use pulse_data::record::{PerformanceRecord, Week};
///
/// let rows = vec![
///     PerformanceRecord { week: Week::AllTime, platform: "x".into(), views: 900, likes: 90, follower_growth: 9 },
///     PerformanceRecord { week: "2024-01-07".parse().unwrap(), platform: "x".into(), views: 100, likes: 10, follower_growth: 1 },
/// ];
/// assert_eq!(summary_metrics(&rows, Partition::AllTime).views, 900);
/// assert_eq!(summary_metrics(&rows, Partition::Weekly).views, 100);
/// ```
pub fn summary_metrics(records: &[PerformanceRecord], partition: Partition) -> MetricTotals {
    let mut totals = MetricTotals::default();
    for record in records.iter().filter(|r| partition.contains(r.week)) {
        totals += record.totals();
    }
    totals
}

/// Distinct calendar weeks, oldest first.
pub fn calendar_weeks(records: &[PerformanceRecord]) -> Vec<NaiveDate> {
    records
        .iter()
        .filter_map(|r| r.week.date())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The most recent calendar week present.
pub fn latest_week(records: &[PerformanceRecord]) -> Option<NaiveDate> {
    records.iter().filter_map(|r| r.week.date()).max()
}

/// The calendar week immediately before [`latest_week`].
pub fn previous_week(records: &[PerformanceRecord]) -> Option<NaiveDate> {
    let weeks = calendar_weeks(records);
    weeks.len().checked_sub(2).map(|i| weeks[i])
}

/// Sum the metrics of one calendar week.
pub fn week_totals(records: &[PerformanceRecord], week: NaiveDate) -> MetricTotals {
    let mut totals = MetricTotals::default();
    for record in records.iter().filter(|r| r.week == Week::Date(week)) {
        totals += record.totals();
    }
    totals
}

/// Per-platform sums over the weekly partition, ordered by platform.
///
/// # Examples
///
/// ```
/// use pulse_data::aggregate::platform_breakdown;
/// use pulse_data::record::PerformanceRecord;
///
/// let rows = vec![
///     PerformanceRecord { week: "2024-01-07".parse().unwrap(), platform: "x".into(), views: 5, likes: 1, follower_growth: 0 },
///     PerformanceRecord { week: "2024-01-14".parse().unwrap(), platform: "x".into(), views: 7, likes: 2, follower_growth: 1 },
///     PerformanceRecord { week: "2024-01-14".parse().unwrap(), platform: "facebook".into(), views: 3, likes: 0, follower_growth: 0 },
/// ];
/// let breakdown = platform_breakdown(&rows);
/// assert_eq!(breakdown[0].platform, "facebook");
/// assert_eq!(breakdown[1].totals.views, 12);
/// ```
pub fn platform_breakdown(records: &[PerformanceRecord]) -> Vec<PlatformTotals> {
    let mut by_platform: BTreeMap<&str, MetricTotals> = BTreeMap::new();
    for record in records.iter().filter(|r| !r.week.is_alltime()) {
        *by_platform.entry(record.platform.as_str()).or_default() += record.totals();
    }

    by_platform
        .into_iter()
        .map(|(platform, totals)| PlatformTotals {
            platform: platform.to_string(),
            totals,
        })
        .collect()
}

/// Per-(week, platform) sums over the weekly partition, ordered by week
/// then platform.
pub fn weekly_trends(records: &[PerformanceRecord]) -> Vec<TrendPoint> {
    let mut by_key: BTreeMap<(NaiveDate, &str), MetricTotals> = BTreeMap::new();
    for record in records {
        let Some(week) = record.week.date() else {
            continue;
        };
        *by_key.entry((week, record.platform.as_str())).or_default() += record.totals();
    }

    by_key
        .into_iter()
        .map(|((week, platform), totals)| TrendPoint {
            week: week.format(WEEK_FORMAT).to_string(),
            platform: platform.to_string(),
            totals,
        })
        .collect()
}

/// Compare the latest week's totals against the previous week's.
///
/// Returns `None` when there are no calendar weeks at all.
pub fn week_comparison(records: &[PerformanceRecord]) -> Option<WeekComparison> {
    let current_week = latest_week(records)?;
    let current = week_totals(records, current_week);
    let previous = previous_week(records).map(|week| (week, week_totals(records, week)));
    Some(WeekComparison::new(current_week, current, previous))
}

/// Week-over-week change for every platform active in the latest week.
///
/// Each platform is compared with the most recent earlier week in which that
/// platform itself has rows, so the comparison does not depend on row order
/// or on how many platforms a week lists. Platforms keep the order of their
/// first row in the latest week.
///
/// # Examples
///
/// ```
/// use pulse_data::aggregate::week_over_week;
/// use pulse_data::record::PerformanceRecord;
///
/// let row = |week: &str, platform: &str, views| PerformanceRecord {
///     week: week.parse().unwrap(),
///     platform: platform.into(),
///     views,
///     likes: 0,
///     follower_growth: 0,
/// };
/// let rows = vec![
///     row("2024-01-14", "tiktok", 150),
///     row("2024-01-07", "tiktok", 100),
/// ];
/// let deltas = week_over_week(&rows);
/// let changes = deltas[0].comparison.changes.unwrap();
/// assert_eq!(changes.views.to_string(), "+50.0%");
/// ```
pub fn week_over_week(records: &[PerformanceRecord]) -> Vec<PlatformDelta> {
    let Some(latest) = latest_week(records) else {
        return Vec::new();
    };

    let mut history: BTreeMap<&str, BTreeMap<NaiveDate, MetricTotals>> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        let Some(week) = record.week.date() else {
            continue;
        };
        let platform = record.platform.as_str();
        if week == latest && !order.contains(&platform) {
            order.push(platform);
        }
        *history
            .entry(platform)
            .or_default()
            .entry(week)
            .or_default() += record.totals();
    }

    order
        .into_iter()
        .filter_map(|platform| {
            let weeks = history.get(platform)?;
            let current = *weeks.get(&latest)?;
            let previous = weeks
                .range(..latest)
                .next_back()
                .map(|(week, totals)| (*week, *totals));
            Some(PlatformDelta {
                platform: platform.to_string(),
                comparison: WeekComparison::new(latest, current, previous),
            })
        })
        .collect()
}

/// The top `n` posts of the most recent week, sorted descending by `key`.
///
/// Ties keep file order. When the posts carry no calendar weeks, the most
/// recent week is the last `n` rows of the file.
///
/// # Examples
///
/// ```
/// use pulse_core::SortKey;
/// use pulse_data::aggregate::top_posts;
/// use pulse_data::record::TopPost;
///
/// let post = |rank, views| TopPost {
///     rank,
///     week: None,
///     post_type: "Reel".into(),
///     link: format!("https://example.com/{rank}"),
///     views,
///     engagement: 0,
/// };
/// let posts = vec![post(1, 10), post(2, 30), post(3, 20)];
/// let top = top_posts(&posts, 2, SortKey::Views);
/// // no weeks: only the last two rows compete
/// assert_eq!(top.len(), 2);
/// assert_eq!(top[0].views, 30);
/// assert_eq!(top[1].views, 20);
/// ```
pub fn top_posts(posts: &[TopPost], n: usize, key: SortKey) -> Vec<TopPost> {
    let latest = posts.iter().filter_map(|p| p.week.and_then(Week::date)).max();

    let mut pool: Vec<TopPost> = match latest {
        Some(week) => posts
            .iter()
            .filter(|p| p.week == Some(Week::Date(week)))
            .cloned()
            .collect(),
        None => posts[posts.len().saturating_sub(n)..].to_vec(),
    };

    pool.sort_by(|a, b| b.metric(key).cmp(&a.metric(key)));
    pool.truncate(n);
    pool
}
