//! Line-delimited JSON record files.
//!
//! Every non-blank line holds one JSON value. Writes always end each record
//! with a newline, so appending to a file never glues two records together.

use crate::errors::{Error, Result};
use crate::utils::truncate_for_log;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

/// How [`write_record_set`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write from the start.
    Overwrite,
    /// Keep existing lines and write after them.
    Append,
}

/// Read every record of a file together with its 1-based line number.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, [`Error::Encoding`] on the first
/// line that is not UTF-8, [`Error::Json`] on the first line that is not valid
/// JSON for `T`.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn read_numbered_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<(usize, T)>> {
    let content = fs::read(path).await?;
    let mut records = Vec::new();
    for (idx, raw) in content.split(|b| *b == b'\n').enumerate() {
        let line = std::str::from_utf8(raw).map_err(|source| {
            warn!(line = idx + 1, error = %source, "Line is not UTF-8");
            Error::Encoding {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            }
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push((idx + 1, record)),
            Err(source) => {
                warn!(
                    line = idx + 1,
                    preview = %truncate_for_log(trimmed, 120),
                    error = %source,
                    "Malformed NDJSON line"
                );
                return Err(Error::Json {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                });
            }
        }
    }
    debug!(count = records.len(), "Read records");
    Ok(records)
}

/// Read every record of a file in file order.
pub async fn read_record_set<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    Ok(read_numbered_records(path)
        .await?
        .into_iter()
        .map(|(_, record)| record)
        .collect())
}

/// Write `records` one JSON document per line, in order.
///
/// The parent directory must already exist.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), ?mode, count = records.len()))]
pub async fn write_record_set<T: Serialize>(path: &Path, records: &[T], mode: WriteMode) -> Result<()> {
    let mut buf = String::new();
    for record in records {
        buf.push_str(&serde_json::to_string(record)?);
        buf.push('\n');
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        WriteMode::Overwrite => options.write(true).truncate(true),
        WriteMode::Append => options.append(true),
    };
    let mut file = options.open(path).await?;
    file.write_all(buf.as_bytes()).await?;
    file.flush().await?;
    debug!(bytes = buf.len(), "Wrote records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CleanedArticle;
    use serde_json::{Value, json};

    fn cleaned(heading: &str) -> CleanedArticle {
        CleanedArticle {
            heading: heading.to_string(),
            sub_heading: "Underrubrik".to_string(),
            body_text: "<p>Brødtekst</p>".to_string(),
            text: format!("{heading}\n Underrubrik\n\n Brødtekst"),
            clean_date: "08-05-2019".to_string(),
            full_text: format!("{heading}\nUnderrubrik\n{heading}\n Underrubrik\n\n Brødtekst"),
        }
    }

    #[tokio::test]
    async fn test_write_then_read_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bt-print_08-05-2019.ndjson");
        let records = vec![cleaned("Første"), cleaned("Anden"), cleaned("Tredje")];

        write_record_set(&path, &records, WriteMode::Overwrite).await.unwrap();
        let back: Vec<CleanedArticle> = read_record_set(&path).await.unwrap();
        assert_eq!(back, records);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_and_append_extends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");

        write_record_set(&path, &[json!({"n": 1}), json!({"n": 2})], WriteMode::Overwrite)
            .await
            .unwrap();
        write_record_set(&path, &[json!({"n": 3})], WriteMode::Overwrite)
            .await
            .unwrap();
        let back: Vec<Value> = read_record_set(&path).await.unwrap();
        assert_eq!(back, vec![json!({"n": 3})]);

        write_record_set(&path, &[json!({"n": 4})], WriteMode::Append)
            .await
            .unwrap();
        let back: Vec<Value> = read_record_set(&path).await.unwrap();
        assert_eq!(back, vec![json!({"n": 3}), json!({"n": 4})]);
    }

    #[tokio::test]
    async fn test_read_skips_blank_lines_and_numbers_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");
        std::fs::write(&path, "{\"n\": 1}\n\n{\"n\": 2}\n").unwrap();

        let records: Vec<(usize, Value)> = read_numbered_records(&path).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 1);
        assert_eq!(records[1].0, 3);
    }

    #[tokio::test]
    async fn test_read_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");
        std::fs::write(&path, "{\"n\": 1}\n{broken\n").unwrap();

        match read_record_set::<Value>(&path).await {
            Err(Error::Json { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_record_set::<Value>(&dir.path().join("missing.ndjson")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_read_invalid_utf8_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.ndjson");
        std::fs::write(&path, b"{\"n\": 1}\n{\"Heading\": \"K\xe6re\"}\n").unwrap();

        match read_record_set::<Value>(&path).await {
            Err(Error::Encoding { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Encoding error, got {other:?}"),
        }
    }
}
