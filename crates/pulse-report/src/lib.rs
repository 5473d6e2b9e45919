//! Dashboard and report rendering for Pulseboard.
//!
//! Builds a [`dashboard::Dashboard`] from the loaded CSV exports and renders
//! it as terminal text, markdown, JSON, standalone HTML, or PDF.

pub mod dashboard;
pub mod format;
pub mod html;
pub mod pdf;

use std::path::{Path, PathBuf};

use pulse_core::Result;
use pulse_data::loader::{load_performance, load_top_posts};
use serde::Serialize;
use tracing::{debug, info};

use crate::dashboard::{Dashboard, DashboardOptions};

/// Inputs and outputs of one report run.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Weekly per-platform metrics file.
    pub social: PathBuf,
    /// Top posts file.
    pub top_posts: PathBuf,
    /// Field delimiter of both files.
    pub delimiter: u8,
    /// PDF destination.
    pub output: PathBuf,
    /// Directory scanned for chart images.
    pub charts_dir: PathBuf,
    /// Also write an HTML copy next to the PDF.
    pub html: bool,
    /// Title, top-N and ranking.
    pub options: DashboardOptions,
}

/// Files written by [`generate_report`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutcome {
    /// The PDF file.
    pub pdf: PathBuf,
    /// The HTML file, when requested.
    pub html: Option<PathBuf>,
    /// Number of chart images embedded in the HTML.
    pub charts: usize,
}

/// Load both input files and aggregate them into a dashboard.
///
/// # Errors
///
/// Returns the first loader error: a missing file, unreadable CSV, missing
/// columns, or an unparseable week.
pub fn load_dashboard(
    social: &Path,
    top_posts: &Path,
    delimiter: u8,
    options: &DashboardOptions,
) -> Result<Dashboard> {
    let records = load_performance(social, delimiter)?;
    let posts = load_top_posts(top_posts, delimiter)?;
    debug!(
        records = records.len(),
        posts = posts.len(),
        "loaded inputs"
    );
    Ok(Dashboard::build(&records, &posts, options))
}

/// Load the inputs and write the PDF report, plus the HTML copy if asked.
///
/// Parent directories of the output are created as needed. The HTML file
/// shares the PDF's path with an `.html` extension.
///
/// # Errors
///
/// Returns any loader error, [`PulseError::Render`](pulse_core::PulseError::Render) if a document cannot be
/// produced, or [`PulseError::Io`](pulse_core::PulseError::Io) if a file cannot be written.
pub fn generate_report(request: &ReportRequest) -> Result<ReportOutcome> {
    let dashboard = load_dashboard(
        &request.social,
        &request.top_posts,
        request.delimiter,
        &request.options,
    )?;

    if let Some(parent) = request.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    pdf::write_pdf(&dashboard, &request.output)?;
    info!(path = %request.output.display(), "PDF report written");

    let mut outcome = ReportOutcome {
        pdf: request.output.clone(),
        html: None,
        charts: 0,
    };

    if request.html {
        let html_path = request.output.with_extension("html");
        let charts = html::find_chart_images(&request.charts_dir, html_path.parent())?;
        std::fs::write(&html_path, html::render_html(&dashboard, &charts))?;
        info!(path = %html_path.display(), charts = charts.len(), "HTML report written");
        outcome.charts = charts.len();
        outcome.html = Some(html_path);
    }

    Ok(outcome)
}
