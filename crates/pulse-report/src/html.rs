//! Standalone HTML rendering of the report.
//!
//! The document carries its own inline stylesheet so it can be opened
//! directly or attached as-is. Chart images are not generated here; any
//! pre-rendered images found in the charts directory are embedded by path.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use pulse_core::{PulseError, Result};
use tracing::debug;

use crate::dashboard::{change_labels, Dashboard};
use crate::format::{escape_html, format_thousands, title_case};

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "svg"];

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 40px; color: #333; }
h1, h2, h3 { color: #1f77b4; }
.metrics { display: flex; justify-content: space-between; margin-bottom: 40px; }
.metric-card { background: #f9f9f9; border-radius: 8px; padding: 20px; width: 30%; text-align: center; box-shadow: 0 0 5px #ddd; }
.metric-value { font-size: 28px; font-weight: bold; }
.metric-label { font-size: 16px; color: #666; }
table { width: 100%; border-collapse: collapse; margin-bottom: 40px; }
th, td { border: 1px solid #ddd; padding: 10px; text-align: center; }
th { background-color: #f0f8ff; }
.chart { margin-bottom: 30px; text-align: center; }
.chart img { max-width: 100%; }
.top-post { background: #f9f9f9; border-radius: 8px; padding: 15px; margin-bottom: 15px; box-shadow: 0 0 5px #ddd; }
.top-post-link { color: #1f77b4; text-decoration: none; font-weight: bold; }
.top-post-label { font-weight: bold; font-size: 16px; }
"#;

/// A pre-rendered chart to embed in the HTML report.
///
/// # Examples
///
/// ```
/// use pulse_report::html::ChartImage;
///
/// let chart = ChartImage::new("charts/views_by_week.png".into(), "charts/views_by_week.png");
/// assert_eq!(chart.caption, "Views By Week");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    /// Image location on disk.
    pub path: PathBuf,
    /// Value of the `src` attribute.
    pub src: String,
    /// Caption derived from the file name.
    pub caption: String,
}

impl ChartImage {
    /// Describe the image at `path`, referenced from the document as `src`.
    pub fn new(path: PathBuf, src: impl Into<String>) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_default();
        Self {
            caption: title_case(&stem),
            src: src.into(),
            path,
        }
    }
}

/// Find chart images in `dir`, sorted by file name.
///
/// `src` attributes are made relative to `document_dir` when the image lives
/// under it, so the HTML file can be moved together with its charts. A
/// missing directory yields no charts.
///
/// # Errors
///
/// Returns [`PulseError::Render`] if the directory cannot be listed.
pub fn find_chart_images(
    dir: &Path,
    document_dir: Option<&Path>,
) -> Result<Vec<ChartImage>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no charts directory");
        return Ok(Vec::new());
    }

    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    let mut paths = Vec::new();
    for ext in IMAGE_EXTENSIONS {
        let pattern = format!("{escaped}/*.{ext}");
        let entries = glob::glob(&pattern)
            .map_err(|e| PulseError::Render(format!("invalid chart pattern {pattern}: {e}")))?;
        for entry in entries {
            let path = entry.map_err(|e| PulseError::Render(format!("reading charts: {e}")))?;
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let charts: Vec<ChartImage> = paths
        .into_iter()
        .map(|path| {
            let src = document_dir
                .and_then(|base| path.strip_prefix(base).ok())
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            ChartImage::new(path.clone(), src)
        })
        .collect();
    debug!(dir = %dir.display(), count = charts.len(), "found chart images");
    Ok(charts)
}

/// Render the report as a standalone HTML document.
///
/// # Examples
///
/// ```
/// use pulse_report::dashboard::{Dashboard, DashboardOptions};
/// use pulse_report::html::render_html;
///
/// let dashboard = Dashboard::build(&[], &[], &DashboardOptions::default());
/// let html = render_html(&dashboard, &[]);
/// assert!(html.starts_with("<!DOCTYPE html>"));
/// assert!(html.contains("All-Time Summary Metrics"));
/// ```
pub fn render_html(dashboard: &Dashboard, charts: &[ChartImage]) -> String {
    let title = escape_html(&dashboard.title);
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{title}</title>");
    let _ = writeln!(out, "<style>{STYLE}</style>\n</head>\n<body>");
    let _ = writeln!(out, "<h1>{title}</h1>");

    let _ = writeln!(out, "<h2>All-Time Summary Metrics</h2>");
    let _ = writeln!(out, "<div class=\"metrics\">");
    for (label, value) in [
        ("Total Views (All-Time)", dashboard.alltime.views),
        ("Total Likes (All-Time)", dashboard.alltime.likes),
        ("Total Follower Growth (All-Time)", dashboard.alltime.follower_growth),
    ] {
        let _ = writeln!(
            out,
            "<div class=\"metric-card\"><div class=\"metric-label\">{label}</div>\
             <div class=\"metric-value\">{}</div></div>",
            format_thousands(value)
        );
    }
    let _ = writeln!(out, "</div>");

    match &dashboard.latest_week {
        Some(latest) => {
            let _ = writeln!(
                out,
                "<h2>Weekly Summary Metrics (Week of {})</h2>",
                latest.current_week
            );
        }
        None => {
            let _ = writeln!(out, "<h2>Weekly Summary Metrics (Latest Week)</h2>");
        }
    }
    let _ = writeln!(out, "<table>\n<thead>\n<tr>");
    for header in [
        "Platform",
        "Views",
        "Likes",
        "Follower Growth",
        "Views % Change",
        "Likes % Change",
        "Follower Growth % Change",
    ] {
        let _ = writeln!(out, "<th>{header}</th>");
    }
    let _ = writeln!(out, "</tr>\n</thead>\n<tbody>");
    for delta in &dashboard.platforms {
        let current = &delta.comparison.current;
        let [views, likes, growth] = change_labels(&delta.comparison);
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{views}</td><td>{likes}</td><td>{growth}</td></tr>",
            escape_html(&title_case(&delta.platform)),
            format_thousands(current.views),
            format_thousands(current.likes),
            format_thousands(current.follower_growth),
        );
    }
    let _ = writeln!(out, "</tbody>\n</table>");

    let _ = writeln!(out, "<h2>Charts and Visualizations</h2>");
    if charts.is_empty() {
        let _ = writeln!(
            out,
            "<p><em>Note: no pre-rendered charts were found for this report.</em></p>"
        );
    }
    for chart in charts {
        let caption = escape_html(&chart.caption);
        let _ = writeln!(
            out,
            "<div class=\"chart\"><img src=\"{}\" alt=\"{caption}\"><p>{caption}</p></div>",
            escape_html(&chart.src)
        );
    }

    let _ = writeln!(out, "<h2>Top {} Posts (Latest Week)</h2>", dashboard.top_posts.len());
    for (i, post) in dashboard.top_posts.iter().enumerate() {
        let link = escape_html(&post.link);
        let _ = writeln!(
            out,
            "<div class=\"top-post\">\
             <div class=\"top-post-label\">{}. {}</div>\
             <div><a class=\"top-post-link\" href=\"{link}\">{link}</a></div>\
             <div><strong>{} views \u{2022} {} engagement</strong></div></div>",
            i + 1,
            escape_html(&post.post_type),
            format_thousands(post.views),
            format_thousands(post.engagement),
        );
    }

    let _ = writeln!(out, "</body>\n</html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardOptions;
    use pulse_data::record::{PerformanceRecord, TopPost};

    fn row(week: &str, platform: &str, views: i64) -> PerformanceRecord {
        PerformanceRecord {
            week: week.parse().unwrap(),
            platform: platform.into(),
            views,
            likes: 10,
            follower_growth: 0,
        }
    }

    fn dashboard() -> Dashboard {
        let rows = vec![
            row("alltime", "instagram", 2_500_000),
            row("2024-02-11", "instagram", 150),
            row("2024-02-04", "instagram", 100),
        ];
        let posts = vec![TopPost {
            rank: 1,
            week: None,
            post_type: "Reel <new>".into(),
            link: "https://example.com/p?a=1&b=2".into(),
            views: 21_300,
            engagement: 1_900,
        }];
        Dashboard::build(&rows, &posts, &DashboardOptions::default())
    }

    #[test]
    fn renders_cards_table_and_posts() {
        let html = render_html(&dashboard(), &[]);
        assert!(html.contains("<div class=\"metric-value\">2,500,000</div>"));
        assert!(html.contains("Weekly Summary Metrics (Week of 2024-02-11)"));
        assert!(html.contains("<td>Instagram</td><td>150</td><td>10</td><td>0</td><td>+50.0%</td><td>0%</td><td>0%</td>"), "{html}");
        assert!(html.contains("1. Reel &lt;new&gt;"));
        assert!(html.contains("href=\"https://example.com/p?a=1&amp;b=2\""));
        assert!(html.contains("21,300 views \u{2022} 1,900 engagement"));
        assert!(html.contains("no pre-rendered charts"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn embeds_chart_images() {
        let charts = vec![ChartImage::new(
            PathBuf::from("reports/charts/views_trend.png"),
            "charts/views_trend.png",
        )];
        let html = render_html(&dashboard(), &charts);
        assert!(html.contains("<img src=\"charts/views_trend.png\" alt=\"Views Trend\">"));
        assert!(!html.contains("no pre-rendered charts"));
    }

    #[test]
    fn finds_images_sorted_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        let charts_dir = dir.path().join("charts");
        std::fs::create_dir(&charts_dir).unwrap();
        for name in ["b_likes.svg", "a_views.png", "notes.txt", "c-growth.jpg"] {
            std::fs::write(charts_dir.join(name), b"x").unwrap();
        }

        let charts = find_chart_images(&charts_dir, Some(dir.path())).unwrap();
        let srcs: Vec<&str> = charts.iter().map(|c| c.src.as_str()).collect();
        assert_eq!(
            srcs,
            vec!["charts/a_views.png", "charts/b_likes.svg", "charts/c-growth.jpg"]
        );
        assert_eq!(charts[2].caption, "C Growth");
    }

    #[test]
    fn missing_charts_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let charts = find_chart_images(&dir.path().join("nope"), None).unwrap();
        assert!(charts.is_empty());
    }
}
