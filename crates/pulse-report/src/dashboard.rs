//! The dashboard view model and its terminal renderings.

use std::fmt;

use pulse_core::SortKey;
use pulse_data::aggregate::{
    platform_breakdown, summary_metrics, top_posts, week_comparison, week_over_week,
    weekly_trends, Partition, PlatformDelta, PlatformTotals, TrendPoint, WeekComparison,
};
use pulse_data::record::{MetricTotals, PerformanceRecord, TopPost};
use serde::Serialize;

use crate::format::{format_thousands, title_case};

/// Knobs for [`Dashboard::build`].
///
/// # Examples
///
/// ```
/// use pulse_report::dashboard::DashboardOptions;
///
/// let options = DashboardOptions::default();
/// assert_eq!(options.top_n, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Report heading.
    pub title: String,
    /// Number of top posts to keep.
    pub top_n: usize,
    /// Ranking column for top posts.
    pub sort_by: SortKey,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            title: "Content Performance Dashboard Report".into(),
            top_n: 5,
            sort_by: SortKey::Views,
        }
    }
}

/// Everything a dashboard or report shows, computed from one load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Report heading.
    pub title: String,
    /// Sums of the `alltime` rows.
    pub alltime: MetricTotals,
    /// Sums of every calendar-week row.
    pub weekly: MetricTotals,
    /// Latest week vs. the week before, across platforms.
    pub latest_week: Option<WeekComparison>,
    /// Latest week vs. previous week, per platform.
    pub platforms: Vec<PlatformDelta>,
    /// Per-platform sums over all calendar weeks.
    pub breakdown: Vec<PlatformTotals>,
    /// Per-(week, platform) series.
    pub trends: Vec<TrendPoint>,
    /// Top posts of the most recent week.
    pub top_posts: Vec<TopPost>,
    /// Column the top posts are ranked by.
    pub sort_by: SortKey,
}

impl Dashboard {
    /// Aggregate loaded rows into a dashboard.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_data::record::{PerformanceRecord, Week};
    /// use pulse_report::dashboard::{Dashboard, DashboardOptions};
    ///
    /// let rows = vec![PerformanceRecord {
    ///     week: Week::AllTime,
    ///     platform: "tiktok".into(),
    ///     views: 1000,
    ///     likes: 10,
    ///     follower_growth: 1,
    /// }];
    /// let dashboard = Dashboard::build(&rows, &[], &DashboardOptions::default());
    /// assert_eq!(dashboard.alltime.views, 1000);
    /// assert!(dashboard.latest_week.is_none());
    /// ```
    pub fn build(
        records: &[PerformanceRecord],
        posts: &[TopPost],
        options: &DashboardOptions,
    ) -> Self {
        Self {
            title: options.title.clone(),
            alltime: summary_metrics(records, Partition::AllTime),
            weekly: summary_metrics(records, Partition::Weekly),
            latest_week: week_comparison(records),
            platforms: week_over_week(records),
            breakdown: platform_breakdown(records),
            trends: weekly_trends(records),
            top_posts: top_posts(posts, options.top_n, options.sort_by),
            sort_by: options.sort_by,
        }
    }

    /// Render the dashboard as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));

        out.push_str("## All-Time Summary\n\n");
        out.push_str(&format!(
            "- **Total Views:** {}\n- **Total Likes:** {}\n- **Total Follower Growth:** {}\n\n",
            format_thousands(self.alltime.views),
            format_thousands(self.alltime.likes),
            format_thousands(self.alltime.follower_growth),
        ));

        if let Some(latest) = &self.latest_week {
            out.push_str(&format!("## Latest Week ({})\n\n", latest.current_week));
            out.push_str("| Metric | This Week | Previous Week | Change |\n");
            out.push_str("|--------|-----------|---------------|--------|\n");
            for row in comparison_rows(latest) {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    row.label, row.current, row.previous, row.change
                ));
            }
            out.push('\n');
        }

        if !self.platforms.is_empty() {
            out.push_str("## Platforms (Latest Week)\n\n");
            out.push_str("| Platform | Views | Likes | Follower Growth | Views % | Likes % | Follower Growth % |\n");
            out.push_str("|----------|-------|-------|-----------------|---------|---------|-------------------|\n");
            for delta in &self.platforms {
                let [views, likes, growth] = change_labels(&delta.comparison);
                let current = &delta.comparison.current;
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {views} | {likes} | {growth} |\n",
                    title_case(&delta.platform),
                    format_thousands(current.views),
                    format_thousands(current.likes),
                    format_thousands(current.follower_growth),
                ));
            }
            out.push('\n');
        }

        if !self.breakdown.is_empty() {
            out.push_str("## Platform Breakdown (All Weeks)\n\n");
            out.push_str("| Platform | Views | Likes | Follower Growth |\n");
            out.push_str("|----------|-------|-------|-----------------|\n");
            for p in &self.breakdown {
                out.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    title_case(&p.platform),
                    format_thousands(p.totals.views),
                    format_thousands(p.totals.likes),
                    format_thousands(p.totals.follower_growth),
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!("## Top Posts (by {})\n\n", self.sort_by));
        if self.top_posts.is_empty() {
            out.push_str("No posts found.\n");
        }
        for (i, post) in self.top_posts.iter().enumerate() {
            out.push_str(&format!(
                "{}. **{}** [{}]({}): {} views, {} engagement\n",
                i + 1,
                post.post_type,
                post.link,
                post.link,
                format_thousands(post.views),
                format_thousands(post.engagement),
            ));
        }
        out
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(
            f,
            "All-time: {} views, {} likes, {} follower growth\n",
            format_thousands(self.alltime.views),
            format_thousands(self.alltime.likes),
            format_thousands(self.alltime.follower_growth),
        )?;

        match &self.latest_week {
            Some(latest) => {
                let previous = latest
                    .previous_week
                    .map_or_else(|| "n/a".to_string(), |w| w.to_string());
                writeln!(f, "Latest week {} (vs {previous})", latest.current_week)?;
                for row in comparison_rows(latest) {
                    writeln!(
                        f,
                        "  {:<16} {:>12} {:>12} {:>10}",
                        row.label, row.current, row.previous, row.change
                    )?;
                }
                writeln!(f)?;
            }
            None => writeln!(f, "No weekly rows.\n")?,
        }

        if !self.platforms.is_empty() {
            writeln!(
                f,
                "{:<12} {:>10} {:>8} {:>8} {:>9} {:>9} {:>9}",
                "Platform", "Views", "Likes", "Growth", "Views %", "Likes %", "Growth %"
            )?;
            writeln!(f, "{}", "-".repeat(72))?;
            for delta in &self.platforms {
                let [views, likes, growth] = change_labels(&delta.comparison);
                let current = &delta.comparison.current;
                writeln!(
                    f,
                    "{:<12} {:>10} {:>8} {:>8} {:>9} {:>9} {:>9}",
                    title_case(&delta.platform),
                    format_thousands(current.views),
                    format_thousands(current.likes),
                    format_thousands(current.follower_growth),
                    views,
                    likes,
                    growth,
                )?;
            }
            writeln!(f)?;
        }

        if !self.breakdown.is_empty() {
            writeln!(f, "Platform breakdown (all weeks):")?;
            for p in &self.breakdown {
                writeln!(
                    f,
                    "  {:<12} {:>12} views {:>10} likes {:>8} growth",
                    title_case(&p.platform),
                    format_thousands(p.totals.views),
                    format_thousands(p.totals.likes),
                    format_thousands(p.totals.follower_growth),
                )?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Top posts (by {}):", self.sort_by)?;
        if self.top_posts.is_empty() {
            writeln!(f, "  none")?;
        }
        for (i, post) in self.top_posts.iter().enumerate() {
            writeln!(
                f,
                "{:>2}. {:<12} {:>10} views {:>8} engagement  {}",
                i + 1,
                post.post_type,
                format_thousands(post.views),
                format_thousands(post.engagement),
                post.link,
            )?;
        }
        Ok(())
    }
}

pub(crate) struct ComparisonRow {
    pub label: &'static str,
    pub current: String,
    pub previous: String,
    pub change: String,
}

pub(crate) fn comparison_rows(comparison: &WeekComparison) -> [ComparisonRow; 3] {
    let current = &comparison.current;
    let previous = comparison.previous.as_ref();
    let [views, likes, growth] = change_labels(comparison);
    let prev = |pick: fn(&MetricTotals) -> i64| {
        previous.map_or_else(|| "n/a".to_string(), |p| format_thousands(pick(p)))
    };
    [
        ComparisonRow {
            label: "Views",
            current: format_thousands(current.views),
            previous: prev(|t| t.views),
            change: views,
        },
        ComparisonRow {
            label: "Likes",
            current: format_thousands(current.likes),
            previous: prev(|t| t.likes),
            change: likes,
        },
        ComparisonRow {
            label: "Follower Growth",
            current: format_thousands(current.follower_growth),
            previous: prev(|t| t.follower_growth),
            change: growth,
        },
    ]
}

/// Views, likes and follower growth change labels; `n/a` without a previous week.
pub(crate) fn change_labels(comparison: &WeekComparison) -> [String; 3] {
    match &comparison.changes {
        Some(c) => [
            c.views.to_string(),
            c.likes.to_string(),
            c.follower_growth.to_string(),
        ],
        None => ["n/a".into(), "n/a".into(), "n/a".into()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_data::record::Week;

    fn row(week: &str, platform: &str, views: i64, likes: i64, growth: i64) -> PerformanceRecord {
        PerformanceRecord {
            week: week.parse().unwrap(),
            platform: platform.into(),
            views,
            likes,
            follower_growth: growth,
        }
    }

    fn post(views: i64, engagement: i64) -> TopPost {
        TopPost {
            rank: 1,
            week: Some(Week::Date(
                chrono::NaiveDate::from_ymd_opt(2024, 2, 11).unwrap(),
            )),
            post_type: "Reel".into(),
            link: format!("https://example.com/{views}"),
            views,
            engagement,
        }
    }

    fn sample() -> Dashboard {
        let rows = vec![
            row("alltime", "tiktok", 1_200_000, 90_000, 4_000),
            row("alltime", "facebook", 300_000, 20_000, 1_000),
            row("2024-02-11", "tiktok", 15_000, 1_200, 0),
            row("2024-02-11", "facebook", 9_000, 300, 25),
            row("2024-02-04", "tiktok", 10_000, 1_200, 0),
            row("2024-02-04", "facebook", 6_000, 400, 0),
        ];
        let posts = vec![post(1_000, 50), post(25_000, 900), post(7_500, 1_100)];
        Dashboard::build(&rows, &posts, &DashboardOptions::default())
    }

    #[test]
    fn build_collects_every_aggregate() {
        let dashboard = sample();
        assert_eq!(dashboard.alltime.views, 1_500_000);
        assert_eq!(dashboard.weekly.views, 40_000);
        assert_eq!(dashboard.platforms.len(), 2);
        assert_eq!(dashboard.breakdown.len(), 2);
        assert_eq!(dashboard.trends.len(), 4);
        assert_eq!(dashboard.top_posts[0].views, 25_000);
    }

    #[test]
    fn text_output_shows_changes() {
        let text = sample().to_string();
        assert!(text.contains("1,500,000 views"), "{text}");
        assert!(text.contains("Tiktok"), "{text}");
        assert!(text.contains("+50.0%"), "{text}");
        assert!(text.contains("+∞%"), "{text}");
        assert!(text.contains("Latest week 2024-02-11 (vs 2024-02-04)"), "{text}");
    }

    #[test]
    fn markdown_output_has_sections() {
        let md = sample().to_markdown();
        assert!(md.contains("# Content Performance Dashboard Report"));
        assert!(md.contains("## Latest Week (2024-02-11)"));
        assert!(md.contains("| Tiktok | 15,000 | 1,200 | 0 | +50.0% | 0% | 0% |"), "{md}");
        assert!(md.contains("1. **Reel** [https://example.com/25000]"), "{md}");
    }

    #[test]
    fn json_output_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["alltime"]["followerGrowth"], 5_000);
        assert_eq!(json["latestWeek"]["changes"]["views"], "+50.0%");
        assert_eq!(json["sortBy"], "views");
        assert_eq!(json["topPosts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn empty_inputs_render() {
        let dashboard = Dashboard::build(&[], &[], &DashboardOptions::default());
        let text = dashboard.to_string();
        assert!(text.contains("No weekly rows."));
        assert!(text.contains("none"));
        assert!(dashboard.to_markdown().contains("No posts found."));
    }
}
