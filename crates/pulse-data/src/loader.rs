//! CSV loading with required-column checks and lenient numeric coercion.
//!
//! Files are read wholesale into a [`RawTable`] of trimmed strings, checked
//! for the columns a table needs, then converted into typed rows. Numeric
//! cells that do not parse become `0` instead of failing the load.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use pulse_core::{PulseError, Result};
use tracing::debug;

use crate::record::{PerformanceRecord, TopPost, Week};

/// Columns the weekly performance export must carry.
pub const PERFORMANCE_COLUMNS: [&str; 5] = ["week", "platform", "views", "likes", "follower_growth"];

/// Columns the top posts export must carry.
pub const TOP_POST_COLUMNS: [&str; 4] = ["Post Type", "Link", "Views", "Engagement"];

/// Optional week column of the top posts export.
pub const TOP_POST_WEEK_COLUMN: &str = "week";

/// A delimited file held as strings: one header row plus data rows.
///
/// # Examples
///
/// ```
/// use pulse_data::loader::RawTable;
///
/// let csv = "week,platform\nalltime,tiktok\n";
/// let table = RawTable::from_reader(csv.as_bytes(), b',', "inline.csv").unwrap();
/// assert_eq!(table.headers, vec!["week", "platform"]);
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Where the table was read from, used in error messages.
    pub source: PathBuf,
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Data rows; may be shorter than `headers`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Read a delimited file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::FileNotFound`] if `path` does not exist,
    /// [`PulseError::Io`] if it cannot be opened, or [`PulseError::Csv`]
    /// if it is not valid delimited text.
    pub fn from_path(path: &Path, delimiter: u8) -> Result<Self> {
        if !path.exists() {
            return Err(PulseError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let table = Self::from_reader(file, delimiter, path)?;
        debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.rows.len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Read delimited text from any reader.
    ///
    /// Headers and cells are trimmed; rows with a different field count
    /// than the header are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Csv`] on malformed input or invalid UTF-8.
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        source: impl Into<PathBuf>,
    ) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self {
            source: source.into(),
            headers,
            rows,
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the file has a header but no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column called `name`, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fail unless every name in `required` is a column of this table.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::MissingColumns`] listing every absent column.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_data::loader::RawTable;
    ///
    /// let table = RawTable::from_reader("week,views\n".as_bytes(), b',', "t.csv").unwrap();
    /// assert!(table.require_columns(&["week"]).is_ok());
    /// assert!(table.require_columns(&["week", "likes"]).is_err());
    /// ```
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PulseError::MissingColumns {
                path: self.source.clone(),
                missing,
            })
        }
    }

    /// The first `n` data rows.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    fn cell(row: &[String], index: usize) -> &str {
        row.get(index).map_or("", String::as_str)
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| PulseError::MissingColumns {
            path: self.source.clone(),
            missing: vec![name.to_string()],
        })
    }
}

/// Coerce a cell to an integer, treating anything non-numeric as `0`.
///
/// Decimal values truncate toward zero.
///
/// # Examples
///
/// ```
/// use pulse_data::loader::coerce_int;
///
/// assert_eq!(coerce_int("42"), 42);
/// assert_eq!(coerce_int(" -7 "), -7);
/// assert_eq!(coerce_int("12.9"), 12);
/// assert_eq!(coerce_int("n/a"), 0);
/// assert_eq!(coerce_int(""), 0);
/// ```
pub fn coerce_int(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => 0,
    }
}

/// Remove thousand-separator punctuation from a numeric-looking cell.
///
/// # Examples
///
/// ```
/// use pulse_data::loader::strip_thousands;
///
/// assert_eq!(strip_thousands("1,234,567"), "1234567");
/// assert_eq!(strip_thousands("12 500"), "12500");
/// ```
pub fn strip_thousands(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ',' | '_' | '\'' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect()
}

/// Load the weekly performance export at `path`.
///
/// # Errors
///
/// Returns [`PulseError::FileNotFound`], [`PulseError::MissingColumns`],
/// or [`PulseError::Parse`] for a week that is neither a date nor `alltime`.
pub fn load_performance(path: &Path, delimiter: u8) -> Result<Vec<PerformanceRecord>> {
    let table = RawTable::from_path(path, delimiter)?;
    performance_records(&table)
}

/// Convert a raw table into performance rows.
///
/// # Examples
///
/// ```
/// use pulse_data::loader::{performance_records, RawTable};
///
/// let csv = "week,platform,views,likes,follower_growth\n\
///            alltime,tiktok,1000,80,12\n\
///            2024-01-07,tiktok,oops,8,1\n";
/// let table = RawTable::from_reader(csv.as_bytes(), b',', "social.csv").unwrap();
/// let rows = performance_records(&table).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].views, 0);
/// ```
pub fn performance_records(table: &RawTable) -> Result<Vec<PerformanceRecord>> {
    table.require_columns(&PERFORMANCE_COLUMNS)?;
    let week = table.index_of("week")?;
    let platform = table.index_of("platform")?;
    let views = table.index_of("views")?;
    let likes = table.index_of("likes")?;
    let follower_growth = table.index_of("follower_growth")?;

    let mut records = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let raw_week = RawTable::cell(row, week);
        let week = raw_week.parse::<Week>().map_err(|_| {
            PulseError::Parse(format!(
                "{}: row {}: invalid week {raw_week:?}",
                table.source.display(),
                i + 1
            ))
        })?;
        records.push(PerformanceRecord {
            week,
            platform: RawTable::cell(row, platform).to_string(),
            views: coerce_int(RawTable::cell(row, views)),
            likes: coerce_int(RawTable::cell(row, likes)),
            follower_growth: coerce_int(RawTable::cell(row, follower_growth)),
        });
    }

    let alltime = records.iter().filter(|r| r.week.is_alltime()).count();
    debug!(
        rows = records.len(),
        alltime,
        weekly = records.len() - alltime,
        "parsed performance records"
    );
    Ok(records)
}

/// Load the top posts export at `path`.
///
/// `Views` and `Engagement` are written with thousands separators in the
/// export; those are stripped before integer coercion.
///
/// # Errors
///
/// Returns [`PulseError::FileNotFound`], [`PulseError::MissingColumns`],
/// or [`PulseError::Parse`] for an invalid `week` cell.
pub fn load_top_posts(path: &Path, delimiter: u8) -> Result<Vec<TopPost>> {
    let table = RawTable::from_path(path, delimiter)?;
    top_post_records(&table)
}

/// Convert a raw table into top post rows, assigning file-order ranks.
///
/// # Examples
///
/// ```
/// use pulse_data::loader::{top_post_records, RawTable};
///
/// let csv = "Post Type,Link,Views,Engagement\n\
///            Reel,https://example.com/1,\"12,400\",\"1,020\"\n";
/// let table = RawTable::from_reader(csv.as_bytes(), b',', "top5.csv").unwrap();
/// let posts = top_post_records(&table).unwrap();
/// assert_eq!(posts[0].views, 12_400);
/// assert_eq!(posts[0].rank, 1);
/// ```
pub fn top_post_records(table: &RawTable) -> Result<Vec<TopPost>> {
    table.require_columns(&TOP_POST_COLUMNS)?;
    let post_type = table.index_of("Post Type")?;
    let link = table.index_of("Link")?;
    let views = table.index_of("Views")?;
    let engagement = table.index_of("Engagement")?;
    let week_column = table.column(TOP_POST_WEEK_COLUMN);

    let mut posts: Vec<TopPost> = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let week = match week_column {
            Some(index) => {
                let raw = RawTable::cell(row, index);
                Some(raw.parse::<Week>().map_err(|_| {
                    PulseError::Parse(format!(
                        "{}: row {}: invalid week {raw:?}",
                        table.source.display(),
                        i + 1
                    ))
                })?)
            }
            None => None,
        };
        let rank = posts.iter().filter(|p| p.week == week).count() + 1;
        posts.push(TopPost {
            rank,
            week,
            post_type: RawTable::cell(row, post_type).to_string(),
            link: RawTable::cell(row, link).to_string(),
            views: coerce_int(&strip_thousands(RawTable::cell(row, views))),
            engagement: coerce_int(&strip_thousands(RawTable::cell(row, engagement))),
        });
    }

    debug!(rows = posts.len(), dated = week_column.is_some(), "parsed top posts");
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(csv: &str) -> RawTable {
        RawTable::from_reader(csv.as_bytes(), b',', "test.csv").unwrap()
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let t = table("week,platform,views\nalltime,x,1\n");
        let err = performance_records(&t).unwrap_err();
        match err {
            PulseError::MissingColumns { missing, .. } => {
                assert_eq!(missing, vec!["likes", "follower_growth"]);
            }
            other => panic!("expected MissingColumns, got {other}"),
        }
    }

    #[test]
    fn top_posts_require_their_columns() {
        let t = table("Post Type,Link,Views\nReel,u,1\n");
        assert!(matches!(
            top_post_records(&t),
            Err(PulseError::MissingColumns { .. })
        ));
    }

    #[test]
    fn non_numeric_cells_become_zero() {
        let t = table(
            "week,platform,views,likes,follower_growth\n\
             2024-01-07,facebook,N/A,,abc\n",
        );
        let rows = performance_records(&t).unwrap();
        assert_eq!(rows[0].views, 0);
        assert_eq!(rows[0].likes, 0);
        assert_eq!(rows[0].follower_growth, 0);
    }

    #[test]
    fn performance_loader_does_not_strip_separators() {
        let t = table(
            "week,platform,views,likes,follower_growth\n\
             2024-01-07,facebook,\"1,200\",5,-3\n",
        );
        let rows = performance_records(&t).unwrap();
        assert_eq!(rows[0].views, 0);
        assert_eq!(rows[0].follower_growth, -3);
    }

    #[test]
    fn weeks_are_coerced() {
        let t = table(
            "week,platform,views,likes,follower_growth\n\
             alltime,x,10,1,1\n\
             2024-01-14,x,5,1,1\n",
        );
        let rows = performance_records(&t).unwrap();
        assert_eq!(rows[0].week, Week::AllTime);
        assert_eq!(
            rows[1].week,
            Week::Date(NaiveDate::from_ymd_opt(2024, 1, 14).unwrap())
        );
    }

    #[test]
    fn invalid_week_names_the_row() {
        let t = table(
            "week,platform,views,likes,follower_growth\n\
             alltime,x,10,1,1\n\
             someday,x,5,1,1\n",
        );
        let err = performance_records(&t).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("row 2"), "{message}");
        assert!(message.contains("someday"), "{message}");
    }

    #[test]
    fn header_only_file_is_empty() {
        let t = table("week,platform,views,likes,follower_growth\n");
        assert!(t.is_empty());
        assert!(performance_records(&t).unwrap().is_empty());
    }

    #[test]
    fn short_rows_are_padded() {
        let t = table("week,platform,views,likes,follower_growth\nalltime,x,7\n");
        let rows = performance_records(&t).unwrap();
        assert_eq!(rows[0].views, 7);
        assert_eq!(rows[0].likes, 0);
    }

    #[test]
    fn cells_and_headers_are_trimmed() {
        let t = table(" week , platform ,views,likes,follower_growth\n alltime , tiktok ,1,2,3\n");
        let rows = performance_records(&t).unwrap();
        assert_eq!(rows[0].platform, "tiktok");
        assert_eq!(rows[0].week, Week::AllTime);
    }

    #[test]
    fn alternate_delimiter() {
        let t = RawTable::from_reader(
            "week;platform;views;likes;follower_growth\nalltime;x;3;2;1\n".as_bytes(),
            b';',
            "semi.csv",
        )
        .unwrap();
        assert_eq!(performance_records(&t).unwrap()[0].views, 3);
    }

    #[test]
    fn top_post_ranks_restart_per_week() {
        let t = table(
            "week,Post Type,Link,Views,Engagement\n\
             2024-01-07,Reel,a,\"1,000\",10\n\
             2024-01-07,Story,b,900,9\n\
             2024-01-14,Reel,c,800,8\n",
        );
        let posts = top_post_records(&t).unwrap();
        let ranks: Vec<usize> = posts.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 1]);
        assert_eq!(posts[0].views, 1_000);
    }

    #[test]
    fn top_posts_without_week_rank_in_file_order() {
        let t = table(
            "Post Type,Link,Views,Engagement\n\
             Reel,a,1,1\n\
             Story,b,2,2\n",
        );
        let posts = top_post_records(&t).unwrap();
        assert_eq!(posts[1].rank, 2);
        assert!(posts.iter().all(|p| p.week.is_none()));
    }

    #[test]
    fn separator_variants_are_stripped() {
        assert_eq!(coerce_int(&strip_thousands("1_000")), 1000);
        assert_eq!(coerce_int(&strip_thousands("1'000")), 1000);
        assert_eq!(coerce_int(&strip_thousands("1\u{a0}000")), 1000);
        assert_eq!(coerce_int(&strip_thousands("views")), 0);
    }

    #[test]
    fn coerce_int_rejects_non_finite() {
        assert_eq!(coerce_int("NaN"), 0);
        assert_eq!(coerce_int("inf"), 0);
        assert_eq!(coerce_int("-3.7"), -3);
    }

    #[test]
    fn head_is_bounded() {
        let t = table("a\n1\n2\n3\n");
        assert_eq!(t.head(2).len(), 2);
        assert_eq!(t.head(10).len(), 3);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = RawTable::from_path(Path::new("/nonexistent/socialmedia.csv"), b',').unwrap_err();
        assert!(matches!(err, PulseError::FileNotFound(_)));
    }
}
