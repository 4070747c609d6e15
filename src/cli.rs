//! Command-line interface definitions for clean_news.
//!
//! Options can be given as flags; the output directory and event table also
//! fall back to environment variables.

use crate::pipeline::DEFAULT_OUTPUT_ROOT;
use crate::sources::SourceKind;
use clap::Parser;

/// Command-line arguments for the cleaning run.
///
/// # Examples
///
/// ```sh
/// # Clean the print archive into ../data/clean_news
/// clean_news -p /data/infomedia
///
/// # Clean web articles with a custom event table, four files at a time
/// clean_news -p /data/infomedia -t web -e events.yaml -j 4
///
/// # Print per-paper daily averages afterwards
/// clean_news -p /data/infomedia --stats --expect-paper politiken-print
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the raw dataset
    #[arg(short, long)]
    pub path: String,

    /// Type of dataset to clean
    #[arg(short = 't', long = "type", value_enum, default_value_t = SourceKind::Print)]
    pub kind: SourceKind,

    /// Output directory receiving one folder per event
    #[arg(short, long, env = "CLEAN_NEWS_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_ROOT)]
    pub output_dir: String,

    /// YAML file replacing the built-in event table
    #[arg(short, long, env = "CLEAN_NEWS_EVENTS")]
    pub events: Option<String>,

    /// Number of output files to write concurrently
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Log per-paper daily article averages for every event after the run
    #[arg(long)]
    pub stats: bool,

    /// Paper that must have output in every event when computing stats
    #[arg(long = "expect-paper", requires = "stats")]
    pub expect_paper: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["clean_news", "--path", "/data/raw"]);

        assert_eq!(cli.path, "/data/raw");
        assert_eq!(cli.kind, SourceKind::Print);
        assert_eq!(cli.output_dir, DEFAULT_OUTPUT_ROOT);
        assert_eq!(cli.events, None);
        assert_eq!(cli.jobs, 1);
        assert!(!cli.stats);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "clean_news",
            "-p",
            "/tmp/raw",
            "-t",
            "web",
            "-o",
            "/tmp/clean",
            "-e",
            "events.yaml",
            "-j",
            "4",
        ]);

        assert_eq!(cli.kind, SourceKind::Web);
        assert_eq!(cli.output_dir, "/tmp/clean");
        assert_eq!(cli.events.as_deref(), Some("events.yaml"));
        assert_eq!(cli.jobs, 4);
    }

    #[test]
    fn test_cli_expected_papers() {
        let cli = Cli::parse_from([
            "clean_news",
            "-p",
            "/tmp/raw",
            "--stats",
            "--expect-paper",
            "bt-print",
            "--expect-paper",
            "politiken-print",
        ]);

        assert!(cli.stats);
        assert_eq!(cli.expect_paper, vec!["bt-print", "politiken-print"]);
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["clean_news", "-p", "/tmp/raw", "-t", "radio"]).is_err());
    }

    #[test]
    fn test_cli_requires_path() {
        assert!(Cli::try_parse_from(["clean_news"]).is_err());
    }
}
