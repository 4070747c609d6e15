//! # clean_news
//!
//! Cleans archived newspaper articles and sorts them into folders for the
//! real-world events they were published around.
//!
//! ## Features
//!
//! - Selects per-paper, per-day NDJSON files whose date falls inside a named
//!   event window (2019 election, mink cull, first COVID-19 lockdown, or a
//!   custom YAML table)
//! - Drops front-page cross references and editorial notes
//! - Strips HTML from body text and builds `text`, `clean_date` and
//!   `full_text` fields
//! - Optionally reports the average number of articles per day per paper
//!
//! ## Usage
//!
//! ```sh
//! clean_news -p /data/infomedia -t print
//! ```
//!
//! ## Architecture
//!
//! 1. **Indexing**: Find the `*print` / `*web` source folders and their files
//! 2. **Matching**: Date each file from its name and look up its events
//! 3. **Cleaning**: Filter and clean the records of every matched file
//! 4. **Output**: Write `<output>/<event>/<paper>_<DD-MM-YYYY>.ndjson`

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod errors;
mod events;
mod models;
mod outputs;
mod pipeline;
mod sources;
mod utils;

use cli::Cli;
use events::EventTable;
use outputs::stats::compute_daily_averages;
use pipeline::PipelineConfig;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("clean_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let events = match &args.events {
        Some(path) => EventTable::load(path).await?,
        None => EventTable::default(),
    };
    if events.is_empty() {
        warn!("Event table has no events; nothing will be written");
    }
    for (name, ranges) in events.iter() {
        let windows: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        debug!(event = name, ?windows, "Event windows");
    }

    let config = PipelineConfig::new(&args.path, args.kind)
        .with_output_root(&args.output_dir)
        .with_events(events)
        .with_jobs(args.jobs);

    let report = match pipeline::run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Cleaning run failed");
            return Err(e.into());
        }
    };
    info!(
        files = report.files_seen,
        written = report.written,
        records = report.records_written,
        unmatched = report.unmatched,
        too_few_records = report.too_few_records,
        bad_filenames = report.bad_filenames,
        failed = report.failed,
        "Cleaning complete"
    );

    if args.stats {
        for (event, _) in config.events.iter() {
            let event_dir = Path::new(&args.output_dir).join(event);
            if !event_dir.is_dir() {
                info!(event, "No output for event");
                continue;
            }
            let stats = compute_daily_averages(&event_dir, &args.expect_paper).await?;
            for (paper, s) in &stats {
                info!(
                    event,
                    paper = %paper,
                    daily_article_average = s.daily_article_average,
                    total_articles = s.total_articles,
                    total_days = s.total_days,
                    "Daily averages"
                );
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
