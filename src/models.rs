//! Data models for archived articles and their cleaned representations.
//!
//! - [`Article`]: a raw record as stored in the per-paper, per-day source files
//! - [`CleanedArticle`]: the record re-emitted into the per-event output files
//! - [`PaperStats`]: per-paper article counts over an output directory
//!
//! The archive uses PascalCase keys (`Heading`, `BodyText`, ...) while the
//! derived fields are snake_case, so every field carries an explicit rename.

use crate::errors::Result;
use crate::utils::normalize_date;
use serde::{Deserialize, Serialize};

/// A raw article record from a source file.
///
/// All four fields are required. Extra keys in the archive (ids, bylines,
/// section names) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// The headline.
    #[serde(rename = "Heading")]
    pub heading: String,
    /// The sub-headline, frequently blank.
    #[serde(rename = "SubHeading")]
    pub sub_heading: String,
    /// Body text, may contain inline HTML markup.
    #[serde(rename = "BodyText")]
    pub body_text: String,
    /// Publication timestamp in `YYYY-MM-DDThh:mm:ssZ` form.
    #[serde(rename = "PublishDate")]
    pub publish_date: String,
}

impl Article {
    /// The publish date normalized to `DD-MM-YYYY`.
    pub fn clean_date(&self) -> Result<String> {
        normalize_date(&self.publish_date)
    }
}

/// An article as written to the per-event output files.
///
/// Field order matches the serialized key order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CleanedArticle {
    #[serde(rename = "Heading")]
    pub heading: String,
    #[serde(rename = "SubHeading")]
    pub sub_heading: String,
    /// The original body text, markup included.
    #[serde(rename = "BodyText")]
    pub body_text: String,
    /// Heading, sub-heading and tag-stripped body joined into one field.
    pub text: String,
    /// Publish date as `DD-MM-YYYY`.
    pub clean_date: String,
    /// Heading, sub-heading and `text`, one per line.
    pub full_text: String,
}

/// Article counts for one paper across an output directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaperStats {
    pub daily_article_average: f64,
    pub total_articles: usize,
    pub total_days: usize,
}
