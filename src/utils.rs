//! Record helpers: text cleaning, date normalization and filename parsing.
//!
//! Source files are named after the paper and day they hold, e.g.
//! `politiken-print_20190507_--.ndjson`, and output files after the paper and
//! the formatted date, e.g. `politiken-print_07-05-2019.ndjson`. Both shapes
//! go through the same filename helpers.

use crate::errors::{Error, Result};
use crate::models::Article;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Timestamp format used by `PublishDate`, e.g. `2020-06-02T00:00:00Z`.
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Date format used for `clean_date`, output filenames and event ranges.
pub const CLEAN_DATE_FORMAT: &str = "%d-%m-%Y";

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Headline markers for front-page cross references and editorial notes.
const IGNORED_HEADING_MARKERS: [&str; 2] = ["Forsidehenvisning", "Note"];

/// Remove every `<...>` tag, keeping the text between tags.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_for_html("<p>Hello <b>World</b></p>"), "Hello World");
/// ```
pub fn strip_for_html(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

/// Whether a record with this headline is a front-page reference or an
/// editorial note and must be left out of the output.
pub fn should_ignore(heading: &str) -> bool {
    IGNORED_HEADING_MARKERS
        .iter()
        .any(|marker| heading.contains(marker))
}

/// Only plain spaces count, a lone newline is not blank.
fn is_blank(s: &str) -> bool {
    s.trim_matches(' ').is_empty()
}

/// Build the composite `text` field of an article.
///
/// Non-blank parts are concatenated in order: the heading as is, the
/// sub-heading prefixed by `"\n "` and the tag-stripped body prefixed by
/// `"\n\n "`. All-blank articles yield an empty string.
pub fn build_text_field(article: &Article) -> String {
    let mut text = String::new();
    if !is_blank(&article.heading) {
        text.push_str(&article.heading);
    }
    if !is_blank(&article.sub_heading) {
        text.push_str("\n ");
        text.push_str(&article.sub_heading);
    }
    if !is_blank(&article.body_text) {
        text.push_str("\n\n ");
        text.push_str(&strip_for_html(&article.body_text));
    }
    text
}

/// Convert a `YYYY-MM-DDThh:mm:ssZ` timestamp to a `DD-MM-YYYY` date.
///
/// # Errors
///
/// Returns [`Error::PublishDate`] if the timestamp is in any other format.
pub fn normalize_date(timestamp: &str) -> Result<String> {
    match NaiveDateTime::parse_from_str(timestamp, PUBLISH_DATE_FORMAT) {
        Ok(parsed) => Ok(parsed.date().format(CLEAN_DATE_FORMAT).to_string()),
        Err(source) => {
            warn!(value = %timestamp, "Unknown date format");
            Err(Error::PublishDate {
                value: timestamp.to_string(),
                source,
            })
        }
    }
}

/// Parse a `DD-MM-YYYY` date.
pub fn parse_clean_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, CLEAN_DATE_FORMAT).ok()
}

/// Read the first eight digits of a filename as a `YYYYMMDD` date.
///
/// # Errors
///
/// Returns [`Error::FilenameDate`] if the name holds fewer than eight digits
/// or they do not form a calendar date.
pub fn parse_filename_date(filename: &str) -> Result<NaiveDate> {
    let digits: String = filename
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(8)
        .collect();
    let invalid = || Error::FilenameDate {
        filename: filename.to_string(),
    };
    if digits.len() < 8 {
        return Err(invalid());
    }

    let year: i32 = digits[..4].parse().map_err(|_| invalid())?;
    let month: u32 = digits[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = digits[6..8].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// The date encoded in a filename, formatted `DD-MM-YYYY`.
pub fn extract_date_from_filename(filename: &str) -> Result<String> {
    Ok(parse_filename_date(filename)?
        .format(CLEAN_DATE_FORMAT)
        .to_string())
}

/// The English weekday name of the date encoded in a filename.
pub fn extract_weekday_from_filename(filename: &str) -> Result<&'static str> {
    let name = match parse_filename_date(filename)?.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    Ok(name)
}

/// The paper identifier of a source or output filename.
///
/// Digits, the `.ndjson` extension and the `_--` left over from a formatted
/// date are removed. Anything after a remaining `_` is an edition suffix and
/// is dropped too, so `ekstrabladet-print_20200315_--edition.ndjson` and
/// `ekstrabladet-print_15-03-2020.ndjson` both give `ekstrabladet-print`.
/// Paper ids are assumed to never contain `_`; one that did would be cut at
/// its first underscore.
pub fn extract_paper_from_filename(filename: &str) -> String {
    let stripped: String = filename.chars().filter(|c| !c.is_ascii_digit()).collect();
    let stripped = stripped.replace(".ndjson", "").replace("_--", "");
    match stripped.split_once('_') {
        Some((paper, _)) => paper.to_string(),
        None => stripped,
    }
}

/// Truncate a string for logging purposes.
///
/// Cuts on a character boundary so multi-byte letters (æ, ø, å) never split.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}…(+{} bytes)", &s[..idx], s.len() - idx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(heading: &str, sub_heading: &str, body_text: &str) -> Article {
        Article {
            heading: heading.to_string(),
            sub_heading: sub_heading.to_string(),
            body_text: body_text.to_string(),
            publish_date: "2019-05-08T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_strip_for_html() {
        assert_eq!(strip_for_html("<p>Hello <b>World</b></p>"), "Hello World");
        assert_eq!(strip_for_html("no tags"), "no tags");
        assert_eq!(strip_for_html("1 < 2"), "1 < 2");
        assert_eq!(strip_for_html("<br/>x<span class=\"q\">y</span>"), "xy");
    }

    #[test]
    fn test_should_ignore() {
        assert!(should_ignore("Forsidehenvisning: Se side 4"));
        assert!(should_ignore("Note til læserne"));
        assert!(should_ignore("Redaktionel Note"));
        assert!(!should_ignore("Statsministeren udskriver valg"));
        // case sensitive, like the archive markers
        assert!(!should_ignore("note"));
    }

    #[test]
    fn test_build_text_field_all_blank() {
        assert_eq!(build_text_field(&article("", "  ", " ")), "");
    }

    #[test]
    fn test_build_text_field_skips_blank_sub_heading() {
        assert_eq!(build_text_field(&article("A", "", "<b>X</b>")), "A\n\n X");
    }

    #[test]
    fn test_build_text_field_all_parts() {
        assert_eq!(
            build_text_field(&article("Valg", "Udskrevet i dag", "<p>Det blev <i>juni</i></p>")),
            "Valg\n Udskrevet i dag\n\n Det blev juni"
        );
    }

    #[test]
    fn test_build_text_field_blank_heading_keeps_separators() {
        assert_eq!(build_text_field(&article(" ", "Sub", "")), "\n Sub");
    }

    #[test]
    fn test_build_text_field_newline_is_not_blank() {
        assert_eq!(build_text_field(&article("H", "\n", "")), "H\n \n");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2020-06-02T00:00:00Z").unwrap(), "02-06-2020");
        assert_eq!(normalize_date("2019-05-07T23:59:59Z").unwrap(), "07-05-2019");
    }

    #[test]
    fn test_normalize_date_rejects_other_formats() {
        for bad in ["2020-06-02", "2020-06-02T00:00:00+02:00", "02-06-2020", ""] {
            match normalize_date(bad) {
                Err(Error::PublishDate { value, .. }) => assert_eq!(value, bad),
                other => panic!("expected PublishDate error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_extract_date_from_filename() {
        let name = "ekstrabladet-print_20200315_--edition.ndjson";
        assert_eq!(extract_date_from_filename(name).unwrap(), "15-03-2020");
        assert_eq!(extract_date_from_filename("bt-print_20190508.ndjson").unwrap(), "08-05-2019");
    }

    #[test]
    fn test_extract_date_uses_first_eight_digits() {
        assert_eq!(
            extract_date_from_filename("jp2019_0507_extra99.ndjson").unwrap(),
            "07-05-2019"
        );
    }

    #[test]
    fn test_extract_date_from_filename_failures() {
        assert!(matches!(
            extract_date_from_filename("bt-print_2019.ndjson"),
            Err(Error::FilenameDate { .. })
        ));
        assert!(matches!(
            extract_date_from_filename("bt-print_20191345.ndjson"),
            Err(Error::FilenameDate { .. })
        ));
        assert!(matches!(
            extract_date_from_filename("bt-print_20190230.ndjson"),
            Err(Error::FilenameDate { .. })
        ));
    }

    #[test]
    fn test_extract_weekday_from_filename() {
        assert_eq!(extract_weekday_from_filename("bt-print_20190507.ndjson").unwrap(), "Tuesday");
        assert_eq!(extract_weekday_from_filename("bt-print_20200315.ndjson").unwrap(), "Sunday");
        assert_eq!(extract_weekday_from_filename("bt-print_20201116.ndjson").unwrap(), "Monday");
    }

    #[test]
    fn test_extract_paper_from_filename() {
        assert_eq!(
            extract_paper_from_filename("ekstrabladet-print_20200315_--edition.ndjson"),
            "ekstrabladet-print"
        );
        assert_eq!(
            extract_paper_from_filename("politiken-print_07-05-2019.ndjson"),
            "politiken-print"
        );
        assert_eq!(
            extract_paper_from_filename("jyllands-posten-print20190507.ndjson"),
            "jyllands-posten-print"
        );
        // ids containing `_` are cut at the first one
        assert_eq!(extract_paper_from_filename("ny_avis-print_20190507.ndjson"), "ny");
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("kort", 100), "kort");
        let s = "æ".repeat(20);
        let result = truncate_for_log(&s, 10);
        assert!(result.starts_with(&"æ".repeat(10)));
        assert!(result.contains("…(+20 bytes)"));
    }
}
