//! PDF rendering of the report.
//!
//! Lays out the same sections as the HTML document on A4 pages using the
//! PDF built-in Helvetica faces, so no font files are needed. Built-in fonts
//! only cover a Latin code page; text is reduced to ASCII before drawing.

use std::path::Path;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use pulse_core::{PulseError, Result};
use tracing::debug;

use crate::dashboard::{change_labels, comparison_rows, Dashboard};
use crate::format::{format_thousands, title_case};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const PT_TO_MM: f32 = 0.3528;

/// Characters of 9pt Helvetica that fit between the margins.
const LINK_CHARS_PER_LINE: usize = 95;

const PLATFORM_COLUMNS: [f32; 7] = [0.0, 32.0, 58.0, 78.0, 104.0, 128.0, 150.0];

struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(pdf_text(title), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PulseError::Render(format!("loading Helvetica: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PulseError::Render(format!("loading Helvetica-Bold: {e}")))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn line_height(size: f32) -> f32 {
        size * PT_TO_MM * 1.5
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed >= MARGIN {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn text(&mut self, text: &str, size: f32, bold: bool) {
        self.row(&[text.to_string()], &[0.0], size, bold);
    }

    fn wrapped(&mut self, text: &str, size: f32, max_chars: usize) {
        for line in wrap_chars(&pdf_text(text), max_chars) {
            self.text(&line, size, false);
        }
    }

    fn row(&mut self, cells: &[String], columns: &[f32], size: f32, bold: bool) {
        let height = Self::line_height(size);
        self.ensure_space(height);
        self.y -= height;
        let font = if bold { &self.bold } else { &self.regular };
        for (cell, x) in cells.iter().zip(columns) {
            self.layer
                .use_text(pdf_text(cell), size, Mm(MARGIN + x), Mm(self.y), font);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| PulseError::Render(format!("serializing PDF: {e}")))
    }
}

/// Reduce text to what the built-in fonts can draw.
fn pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{221e}' => out.push_str("inf"),
            '\u{2022}' => out.push('-'),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Split `text` into lines of at most `max_chars` characters.
fn wrap_chars(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(max_chars.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Render the report as PDF bytes.
///
/// # Errors
///
/// Returns [`PulseError::Render`] if the document cannot be assembled.
///
/// # Examples
///
/// ```
/// use pulse_report::dashboard::{Dashboard, DashboardOptions};
/// use pulse_report::pdf::render_pdf;
///
/// let dashboard = Dashboard::build(&[], &[], &DashboardOptions::default());
/// let bytes = render_pdf(&dashboard).unwrap();
/// assert!(bytes.starts_with(b"%PDF"));
/// ```
pub fn render_pdf(dashboard: &Dashboard) -> Result<Vec<u8>> {
    let mut page = PageWriter::new(&dashboard.title)?;

    page.text(&dashboard.title, 20.0, true);
    page.gap(4.0);

    page.text("All-Time Summary Metrics", 14.0, true);
    page.text(
        &format!(
            "Total Views: {}    Total Likes: {}    Total Follower Growth: {}",
            format_thousands(dashboard.alltime.views),
            format_thousands(dashboard.alltime.likes),
            format_thousands(dashboard.alltime.follower_growth),
        ),
        11.0,
        false,
    );
    page.gap(4.0);

    match &dashboard.latest_week {
        Some(latest) => {
            page.text(
                &format!("Weekly Summary Metrics (Week of {})", latest.current_week),
                14.0,
                true,
            );
            let columns = [0.0, 45.0, 80.0, 120.0];
            page.row(
                &[
                    "Metric".into(),
                    "This Week".into(),
                    "Previous Week".into(),
                    "Change".into(),
                ],
                &columns,
                10.0,
                true,
            );
            for row in comparison_rows(latest) {
                page.row(
                    &[row.label.to_string(), row.current, row.previous, row.change],
                    &columns,
                    10.0,
                    false,
                );
            }
        }
        None => page.text("No weekly rows.", 11.0, false),
    }
    page.gap(4.0);

    if !dashboard.platforms.is_empty() {
        page.text("Platforms (Latest Week)", 14.0, true);
        page.row(
            &[
                "Platform".into(),
                "Views".into(),
                "Likes".into(),
                "Growth".into(),
                "Views %".into(),
                "Likes %".into(),
                "Growth %".into(),
            ],
            &PLATFORM_COLUMNS,
            10.0,
            true,
        );
        for delta in &dashboard.platforms {
            let current = &delta.comparison.current;
            let [views, likes, growth] = change_labels(&delta.comparison);
            page.row(
                &[
                    title_case(&delta.platform),
                    format_thousands(current.views),
                    format_thousands(current.likes),
                    format_thousands(current.follower_growth),
                    views,
                    likes,
                    growth,
                ],
                &PLATFORM_COLUMNS,
                10.0,
                false,
            );
        }
        page.gap(4.0);
    }

    page.text("Charts and Visualizations", 14.0, true);
    page.text(
        "Note: charts are not included in the PDF export; see the HTML report.",
        10.0,
        false,
    );
    page.gap(4.0);

    page.text(
        &format!("Top {} Posts (Latest Week)", dashboard.top_posts.len()),
        14.0,
        true,
    );
    for (i, post) in dashboard.top_posts.iter().enumerate() {
        page.text(&format!("{}. {}", i + 1, post.post_type), 11.0, true);
        page.wrapped(&post.link, 9.0, LINK_CHARS_PER_LINE);
        page.text(
            &format!(
                "{} views \u{2022} {} engagement",
                format_thousands(post.views),
                format_thousands(post.engagement)
            ),
            10.0,
            false,
        );
        page.gap(2.0);
    }

    page.finish()
}

/// Render the report and write it to `path`.
///
/// # Errors
///
/// Returns [`PulseError::Render`] on layout failure or [`PulseError::Io`]
/// if the file cannot be written.
pub fn write_pdf(dashboard: &Dashboard, path: &Path) -> Result<()> {
    let bytes = render_pdf(dashboard)?;
    std::fs::write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote PDF");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardOptions;
    use pulse_data::record::{PerformanceRecord, TopPost};

    #[test]
    fn pdf_text_is_ascii() {
        assert_eq!(pdf_text("+\u{221e}%"), "+inf%");
        assert_eq!(pdf_text("10 views \u{2022} 2"), "10 views - 2");
        assert_eq!(pdf_text("Caf\u{e9}"), "Caf?");
    }

    fn page_count(bytes: &[u8]) -> usize {
        let text = String::from_utf8_lossy(bytes);
        text.match_indices("/Type")
            .filter(|(i, _)| {
                let rest = text[i + "/Type".len()..].trim_start();
                rest.starts_with("/Page") && !rest.starts_with("/Pages")
            })
            .count()
    }

    #[test]
    fn wrap_chars_splits_long_links() {
        let link = format!("https://example.com/{}", "a".repeat(200));
        let lines = wrap_chars(&link, LINK_CHARS_PER_LINE);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.chars().count() <= LINK_CHARS_PER_LINE));
        assert_eq!(lines.concat(), link);
        assert_eq!(wrap_chars("", 10), vec![String::new()]);
    }

    #[test]
    fn long_reports_span_pages() {
        let rows: Vec<PerformanceRecord> = (0..80)
            .map(|i| PerformanceRecord {
                week: "2024-02-11".parse().unwrap(),
                platform: format!("platform-{i:02}"),
                views: i,
                likes: i,
                follower_growth: i,
            })
            .collect();
        let posts: Vec<TopPost> = (0..40)
            .map(|i| TopPost {
                rank: i + 1,
                week: None,
                post_type: "Reel".into(),
                link: format!("https://example.com/{i}/{}", "x".repeat(150)),
                views: i as i64,
                engagement: 0,
            })
            .collect();
        let options = DashboardOptions {
            top_n: 40,
            ..DashboardOptions::default()
        };
        let dashboard = Dashboard::build(&rows, &posts, &options);
        let bytes = render_pdf(&dashboard).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(page_count(&bytes) > 1, "expected a page break");

        let short = render_pdf(&Dashboard::build(&[], &[], &DashboardOptions::default())).unwrap();
        assert_eq!(page_count(&short), 1);
    }

    #[test]
    fn write_pdf_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        let dashboard = Dashboard::build(&[], &[], &DashboardOptions::default());
        write_pdf(&dashboard, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
