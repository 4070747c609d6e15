//! Articles-per-day statistics over an event output directory.

use crate::errors::{Error, Result};
use crate::models::PaperStats;
use crate::outputs::ndjson::read_record_set;
use crate::sources::list_files;
use crate::utils::extract_paper_from_filename;
use itertools::Itertools;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

impl PaperStats {
    /// Summarize the per-day record counts of one paper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if `daily_counts` is empty.
    pub fn from_daily_counts(paper: &str, daily_counts: &[usize]) -> Result<Self> {
        if daily_counts.is_empty() {
            return Err(Error::NoData {
                paper: paper.to_string(),
            });
        }
        let total_articles: usize = daily_counts.iter().sum();
        let total_days = daily_counts.len();
        Ok(Self {
            daily_article_average: total_articles as f64 / total_days as f64,
            total_articles,
            total_days,
        })
    }
}

/// Average number of articles per day for each paper in `dir`.
///
/// Every file counts as one day of its paper. Papers are taken from the
/// filenames found; `expected` papers are included as well and yield
/// [`Error::NoData`] when none of their files are present.
#[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
pub async fn compute_daily_averages(dir: &Path, expected: &[String]) -> Result<BTreeMap<String, PaperStats>> {
    let mut counts = Vec::new();
    for file in list_files(dir).await? {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let records: Vec<Value> = read_record_set(&file).await?;
        counts.push((extract_paper_from_filename(&name), records.len()));
    }

    let mut by_paper: BTreeMap<String, Vec<usize>> = counts.into_iter().into_group_map().into_iter().collect();
    for paper in expected {
        by_paper.entry(paper.clone()).or_default();
    }

    let stats = by_paper
        .iter()
        .map(|(paper, daily)| Ok((paper.clone(), PaperStats::from_daily_counts(paper, daily)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    info!(papers = stats.len(), "Computed daily averages");
    Ok(stats)
}
