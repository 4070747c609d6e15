//! Record file I/O and statistics over the cleaned output.
//!
//! # Submodules
//!
//! - [`ndjson`]: Reads and writes line-delimited JSON record files
//! - [`stats`]: Articles-per-day averages for each paper in an event folder
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 2019_election_announcement/
//! │   ├── politiken-print_07-05-2019.ndjson
//! │   └── politiken-print_08-05-2019.ndjson
//! └── covid_week_1/
//!     └── bt-print_10-03-2020.ndjson
//! ```

pub mod ndjson;
pub mod stats;
