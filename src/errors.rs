//! Typed errors for the cleaning pipeline.
//!
//! Per-file problems (bad filename, malformed line, bad publish date) let the
//! run continue with the next file. I/O failures abort the run, see
//! [`Error::is_fatal`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, cleaning or writing article records.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line in a record file is not valid JSON
    #[error("invalid JSON in {} at line {line}: {source}", path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A line in a record file is not valid UTF-8
    #[error("invalid UTF-8 in {} at line {line}: {source}", path.display())]
    Encoding {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    /// A record is valid JSON but does not match the article schema
    #[error("schema violation in {} at line {line}: {source}", path.display())]
    Schema {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized for writing
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// `PublishDate` is not in `YYYY-MM-DDThh:mm:ssZ` form
    #[error("unknown date format: {value:?}")]
    PublishDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The filename does not start its digits with a valid `YYYYMMDD` date
    #[error("no valid YYYYMMDD date in filename {filename:?}")]
    FilenameDate { filename: String },

    /// An event range bound is not a `DD-MM-YYYY` date, or start > end
    #[error("invalid date range {start:?}..={end:?}: {reason}")]
    InvalidRange {
        start: String,
        end: String,
        reason: String,
    },

    /// The event table file could not be parsed
    #[error("invalid event table: {0}")]
    EventTable(#[from] serde_yaml::Error),

    /// Statistics were requested for a paper without any output files
    #[error("no data for paper {paper}")]
    NoData { paper: String },
}

impl Error {
    /// Whether the error should abort the whole run instead of only the
    /// current file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_io_is_fatal() {
        let io = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io.is_fatal());

        let name = Error::FilenameDate {
            filename: "bt-print.ndjson".to_string(),
        };
        assert!(!name.is_fatal());
        assert!(!Error::NoData { paper: "bt-print".to_string() }.is_fatal());

        let encoding = Error::Encoding {
            path: PathBuf::from("bt-print_20190507.ndjson"),
            line: 1,
            source: std::str::from_utf8(b"\xe6").unwrap_err(),
        };
        assert!(!encoding.is_fatal());
    }

    #[test]
    fn test_display_mentions_paper() {
        let e = Error::NoData {
            paper: "politiken-print".to_string(),
        };
        assert_eq!(e.to_string(), "no data for paper politiken-print");
    }
}
