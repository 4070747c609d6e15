//! Named events and the inclusive date windows that bucket articles into them.
//!
//! The default table covers the 2019 Danish general election, the 2020 mink
//! cull and the first two weeks of the COVID-19 lockdown. A YAML file with the
//! same shape can replace it:
//!
//! ```yaml
//! 2019_election_announcement:
//!   - ["07-05-2019", "09-05-2019"]
//! nurse_strike:
//!   - ["12-06-2021", "26-06-2021"]
//!   - ["23-08-2021", "30-08-2021"]
//! ```

use crate::errors::{Error, Result};
use crate::utils::{CLEAN_DATE_FORMAT, parse_clean_date};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// An inclusive `[start, end]` window of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(String, String)")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range from two `DD-MM-YYYY` bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if either bound does not parse or the
    /// start falls after the end.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
            reason: reason.to_string(),
        };
        let first = parse_clean_date(start).ok_or_else(|| invalid("start is not DD-MM-YYYY"))?;
        let last = parse_clean_date(end).ok_or_else(|| invalid("end is not DD-MM-YYYY"))?;
        if first > last {
            return Err(invalid("start is after end"));
        }
        Ok(Self {
            start: first,
            end: last,
        })
    }

    /// Whether `date` falls inside the range, both ends included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl TryFrom<(String, String)> for DateRange {
    type Error = Error;

    fn try_from((start, end): (String, String)) -> Result<Self> {
        DateRange::parse(&start, &end)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..={}",
            self.start.format(CLEAN_DATE_FORMAT),
            self.end.format(CLEAN_DATE_FORMAT)
        )
    }
}

/// Event name to date windows, iterated in name order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EventTable {
    events: BTreeMap<String, Vec<DateRange>>,
}

impl EventTable {
    /// Build a table from `(name, [(start, end), ...])` entries with
    /// `DD-MM-YYYY` bounds.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<(&'a str, &'a str)>)>,
    {
        let mut events = BTreeMap::new();
        for (name, ranges) in entries {
            let ranges = ranges
                .into_iter()
                .map(|(start, end)| DateRange::parse(start, end))
                .collect::<Result<Vec<_>>>()?;
            events.insert(name.to_string(), ranges);
        }
        Ok(Self { events })
    }

    /// Parse a YAML event table.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML event table from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = fs::read_to_string(path.as_ref()).await?;
        let table = Self::from_yaml(&yaml)?;
        info!(events = table.len(), "Loaded event table");
        Ok(table)
    }

    /// Names of every event with a window containing `date`, each listed
    /// once even if several of its windows match.
    pub fn matching_events(&self, date: NaiveDate) -> Vec<&str> {
        self.events
            .iter()
            .filter(|(_, ranges)| ranges.iter().any(|range| range.contains(date)))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DateRange])> {
        self.events
            .iter()
            .map(|(name, ranges)| (name.as_str(), ranges.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventTable {
    fn default() -> Self {
        let entries = vec![
            // election announcement
            ("2019_election_announcement", vec![("07-05-2019", "09-05-2019")]),
            // campaign and election day
            ("2019_election_campagin", vec![("29-05-2019", "06-06-2019")]),
            // government formation
            ("2019_election_government", vec![("25-06-2019", "27-06-2019")]),
            ("mink_start", vec![("04-11-2020", "12-11-2020")]),
            ("mink_mogens_jensen", vec![("17-11-2020", "19-11-2020")]),
            // first lockdown
            ("covid_week_1", vec![("10-03-2020", "17-03-2020")]),
            ("covid_week_2", vec![("18-03-2020", "25-03-2020")]),
        ];
        Self::from_entries(entries).expect("default event table has valid ranges")
    }
}
