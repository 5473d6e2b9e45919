use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PulseError;
use crate::Result;
use crate::types::SortKey;

/// Top-level configuration loaded from `.pulse.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use pulse_core::PulseConfig;
///
/// let config = PulseConfig::default();
/// assert_eq!(config.dashboard.top_n, 5);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Input file locations.
    #[serde(default)]
    pub input: InputConfig,
    /// PDF / HTML report settings.
    #[serde(default)]
    pub report: ReportConfig,
    /// Terminal dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl PulseConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Io`] if the file cannot be read, or
    /// [`PulseError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pulse_core::PulseConfig;
    /// use std::path::Path;
    ///
    /// let config = PulseConfig::from_file(Path::new(".pulse.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_core::PulseConfig;
    ///
    /// let toml = r#"
    /// [dashboard]
    /// top_n = 3
    /// "#;
    /// let config = PulseConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.dashboard.top_n, 3);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Locations and dialect of the two input files.
///
/// # Examples
///
/// ```
/// use pulse_core::InputConfig;
///
/// let input = InputConfig::default();
/// assert_eq!(input.delimiter, ',');
/// assert!(input.social.ends_with("socialmedia.csv"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Weekly per-platform metrics file.
    #[serde(default = "default_social")]
    pub social: PathBuf,
    /// Top posts file.
    #[serde(default = "default_top_posts")]
    pub top_posts: PathBuf,
    /// Field delimiter shared by both files.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_social() -> PathBuf {
    PathBuf::from("data/input/socialmedia.csv")
}

fn default_top_posts() -> PathBuf {
    PathBuf::from("data/input/top5.csv")
}

fn default_delimiter() -> char {
    ','
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            social: default_social(),
            top_posts: default_top_posts(),
            delimiter: default_delimiter(),
        }
    }
}

impl InputConfig {
    /// The delimiter as the single byte the CSV reader expects.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Config`] for a non-ASCII delimiter.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_core::InputConfig;
    ///
    /// let mut input = InputConfig::default();
    /// assert_eq!(input.delimiter_byte().unwrap(), b',');
    ///
    /// input.delimiter = '§';
    /// assert!(input.delimiter_byte().is_err());
    /// ```
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PulseError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )))
        }
    }
}

/// Report output configuration.
///
/// # Examples
///
/// ```
/// use pulse_core::ReportConfig;
///
/// let config = ReportConfig::default();
/// assert!(config.html);
/// assert!(config.output.ends_with("summary_report.pdf"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// PDF output path; the HTML copy lands next to it.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Directory scanned for pre-rendered chart images.
    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,
    /// Also write the HTML document (default: true).
    #[serde(default = "default_html")]
    pub html: bool,
    /// Report heading.
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_output() -> PathBuf {
    PathBuf::from("reports/summary_report.pdf")
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from("reports/charts")
}

fn default_html() -> bool {
    true
}

fn default_title() -> String {
    "Content Performance Dashboard Report".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            charts_dir: default_charts_dir(),
            html: default_html(),
            title: default_title(),
        }
    }
}

/// Terminal dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Number of top posts to show (default: 5).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Ranking column for top posts (default: views).
    #[serde(default)]
    pub sort_by: SortKey,
}

fn default_top_n() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            sort_by: SortKey::default(),
        }
    }
}
