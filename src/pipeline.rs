//! The event pipeline: find source files whose day falls inside an event
//! window, clean their articles and write them under the event's folder.
//!
//! # Flow
//!
//! 1. **Indexing**: list the `*print` or `*web` subfolders of the input root
//!    and the day files inside them
//! 2. **Matching**: parse each filename's date and look up the events whose
//!    windows contain it. Files matching no event are never opened
//! 3. **Cleaning**: for every (file, event) pair read the records, drop
//!    front-page references and notes, build `text`, `clean_date` and
//!    `full_text`
//! 4. **Output**: overwrite `<output_root>/<event>/<paper>_<DD-MM-YYYY>.ndjson`
//!
//! Files holding a single record are placeholders for days without a paper
//! and produce no output.

use crate::errors::{Error, Result};
use crate::events::EventTable;
use crate::models::{Article, CleanedArticle};
use crate::outputs::ndjson::{WriteMode, read_numbered_records, write_record_set};
use crate::sources::{SourceKind, list_files, list_subfolders};
use crate::utils::{
    build_text_field, extract_date_from_filename, extract_paper_from_filename,
    extract_weekday_from_filename, parse_filename_date, should_ignore,
};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "../data/clean_news";

/// Everything a pipeline run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Folder holding the per-paper source subfolders.
    pub input_root: PathBuf,
    /// Which subfolders to clean.
    pub kind: SourceKind,
    /// Folder receiving one subfolder per event.
    pub output_root: PathBuf,
    /// Event windows to bucket files into.
    pub events: EventTable,
    /// Number of output files written concurrently.
    pub jobs: usize,
}

impl PipelineConfig {
    pub fn new(input_root: impl Into<PathBuf>, kind: SourceKind) -> Self {
        Self {
            input_root: input_root.into(),
            kind,
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            events: EventTable::default(),
            jobs: 1,
        }
    }

    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    pub fn with_events(mut self, events: EventTable) -> Self {
        self.events = events;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }
}

/// What [`clean_and_save`] did with a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Cleaned records were written to `path`.
    Written { path: PathBuf, records: usize },
    /// The file held `count <= 1` records and was left alone.
    TooFewRecords { count: usize },
}

/// Counts collected over one [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files found in the matching subfolders.
    pub files_seen: usize,
    /// Files whose name holds no valid date.
    pub bad_filenames: usize,
    /// Files dated outside every event window.
    pub unmatched: usize,
    /// Output files written.
    pub written: usize,
    /// Cleaned records across all written files.
    pub records_written: usize,
    /// (file, event) pairs skipped for holding at most one record.
    pub too_few_records: usize,
    /// (file, event) pairs that failed and were not written.
    pub failed: usize,
}

/// One source file to clean into one event folder.
#[derive(Debug, Clone)]
struct Job {
    source: PathBuf,
    event: String,
    out_dir: PathBuf,
    output: PathBuf,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Clean a single article.
///
/// # Errors
///
/// Returns [`Error::PublishDate`] if the publish date cannot be normalized.
pub fn clean_article(article: Article) -> Result<CleanedArticle> {
    let text = build_text_field(&article);
    let clean_date = article.clean_date()?;
    let full_text = [article.heading.as_str(), article.sub_heading.as_str(), text.as_str()].join("\n");
    Ok(CleanedArticle {
        heading: article.heading,
        sub_heading: article.sub_heading,
        body_text: article.body_text,
        text,
        clean_date,
        full_text,
    })
}

/// Where the cleaned version of `source` goes inside `out_dir`.
pub fn output_path(source: &Path, out_dir: &Path) -> Result<PathBuf> {
    let name = file_name(source);
    let paper = extract_paper_from_filename(&name);
    let date = extract_date_from_filename(&name)?;
    Ok(out_dir.join(format!("{paper}_{date}.ndjson")))
}

/// Clean one source file and overwrite its output file in `out_dir`.
///
/// Files with at most one record are skipped. Records whose heading marks
/// them as front-page references or notes are dropped before the schema is
/// checked, so they may lack the other fields.
///
/// # Errors
///
/// - [`Error::Io`] if the file cannot be read or the output cannot be written
/// - [`Error::Json`] / [`Error::Schema`] for malformed records
/// - [`Error::Encoding`] for a line that is not UTF-8
/// - [`Error::PublishDate`] for an unparseable publish date
///
/// Nothing is written when an error is returned.
#[instrument(level = "info", skip_all, fields(source = %file.display(), out_dir = %out_dir.display()))]
pub async fn clean_and_save(file: &Path, out_dir: &Path) -> Result<FileOutcome> {
    let records: Vec<(usize, Value)> = read_numbered_records(file).await?;
    if records.len() <= 1 {
        debug!(count = records.len(), "No real data in file; skipping");
        return Ok(FileOutcome::TooFewRecords {
            count: records.len(),
        });
    }

    let total = records.len();
    let mut cleaned = Vec::with_capacity(total);
    for (line, record) in records {
        let ignored = record
            .get("Heading")
            .and_then(Value::as_str)
            .is_some_and(should_ignore);
        if ignored {
            continue;
        }
        let article: Article = serde_json::from_value(record).map_err(|source| Error::Schema {
            path: file.to_path_buf(),
            line,
            source,
        })?;
        cleaned.push(clean_article(article)?);
    }

    let path = output_path(file, out_dir)?;
    fs::create_dir_all(out_dir).await?;
    write_record_set(&path, &cleaned, WriteMode::Overwrite).await?;
    info!(
        path = %path.display(),
        records = cleaned.len(),
        ignored = total - cleaned.len(),
        "Wrote cleaned articles"
    );
    Ok(FileOutcome::Written {
        path,
        records: cleaned.len(),
    })
}

/// Run the jobs of one output file in order, stopping at a fatal error.
async fn process_group(group: Vec<Job>) -> Vec<(Job, Result<FileOutcome>)> {
    let mut done = Vec::with_capacity(group.len());
    for job in group {
        let result = clean_and_save(&job.source, &job.out_dir).await;
        let fatal = matches!(&result, Err(e) if e.is_fatal());
        done.push((job, result));
        if fatal {
            break;
        }
    }
    done
}

/// Clean every source file of `config.kind` that falls inside an event
/// window.
///
/// A file inside windows of several events is cleaned once per event.
/// Files with a malformed name and files failing to clean are logged and
/// counted; I/O errors abort the run.
#[instrument(level = "info", skip_all, fields(input_root = %config.input_root.display(), kind = %config.kind))]
pub async fn run(config: &PipelineConfig) -> Result<RunReport> {
    let mut report = RunReport::default();
    let mut jobs = Vec::new();

    for folder in list_subfolders(&config.input_root, config.kind.suffix()).await? {
        for file in list_files(&folder).await? {
            report.files_seen += 1;
            let name = file_name(&file);
            let date = match parse_filename_date(&name) {
                Ok(date) => date,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Skipping file with malformed name");
                    report.bad_filenames += 1;
                    continue;
                }
            };

            let events = config.events.matching_events(date);
            if events.is_empty() {
                report.unmatched += 1;
                continue;
            }
            debug!(
                file = %name,
                weekday = extract_weekday_from_filename(&name).unwrap_or_default(),
                events = ?events,
                "File matches events"
            );
            for event in events {
                let out_dir = config.output_root.join(event);
                jobs.push(Job {
                    output: output_path(&file, &out_dir)?,
                    source: file.clone(),
                    event: event.to_string(),
                    out_dir,
                });
            }
        }
    }

    // Jobs sharing an output file stay sequential.
    let groups: BTreeMap<PathBuf, Vec<Job>> = jobs
        .into_iter()
        .into_group_map_by(|job| job.output.clone())
        .into_iter()
        .collect();
    info!(
        files = report.files_seen,
        outputs = groups.len(),
        jobs = config.jobs,
        "Cleaning matched files"
    );

    let mut outcomes = std::pin::pin!(
        stream::iter(groups.into_values())
            .map(process_group)
            .buffer_unordered(config.jobs.max(1))
    );
    while let Some(group) = outcomes.next().await {
        for (job, result) in group {
            match result {
                Ok(FileOutcome::Written { path, records }) => {
                    debug!(event = %job.event, path = %path.display(), records, "Output written");
                    report.written += 1;
                    report.records_written += records;
                }
                Ok(FileOutcome::TooFewRecords { count }) => {
                    debug!(source = %job.source.display(), count, "Skipped file without real data");
                    report.too_few_records += 1;
                }
                Err(e) if e.is_fatal() => {
                    error!(source = %job.source.display(), event = %job.event, error = %e, "Aborting run");
                    return Err(e);
                }
                Err(e) => {
                    warn!(source = %job.source.display(), event = %job.event, error = %e, "File not written");
                    report.failed += 1;
                }
            }
        }
    }

    info!(?report, "Pipeline finished");
    Ok(report)
}
