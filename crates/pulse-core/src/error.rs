use std::path::PathBuf;

/// Errors that can occur while loading, aggregating, or rendering
/// performance data.
///
/// Library crates use this type directly; the binary collapses every
/// variant into one generic diagnostic at the top level.
///
/// # Examples
///
/// ```
/// use pulse_core::PulseError;
///
/// let err = PulseError::Config("unknown sort key".into());
/// assert!(err.to_string().contains("unknown sort key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PulseError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The delimited file could not be read as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns are absent from a file.
    #[error("{} is missing required columns: {}", .path.display(), .missing.join(", "))]
    #[diagnostic(help("check the header row of the exported CSV"))]
    MissingColumns {
        /// File that was checked.
        path: PathBuf,
        /// Every required column that was not found.
        missing: Vec<String>,
    },

    /// A cell could not be coerced to the expected type.
    #[error("parse error: {0}")]
    Parse(String),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Report rendering (HTML or PDF) failed.
    #[error("render error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PulseError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = PulseError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = PulseError::FileNotFound(PathBuf::from("data/input/top5.csv"));
        assert!(err.to_string().contains("data/input/top5.csv"));
    }

    #[test]
    fn missing_columns_lists_every_column() {
        let err = PulseError::MissingColumns {
            path: PathBuf::from("socialmedia.csv"),
            missing: vec!["likes".into(), "follower_growth".into()],
        };
        assert_eq!(
            err.to_string(),
            "socialmedia.csv is missing required columns: likes, follower_growth"
        );
    }

    #[test]
    fn toml_error_converts_through_result_alias() {
        fn parse(content: &str) -> crate::Result<toml::Value> {
            Ok(toml::from_str(content)?)
        }
        let err = parse("[dashboard\n").unwrap_err();
        assert!(matches!(err, PulseError::Toml(_)));
    }
}
