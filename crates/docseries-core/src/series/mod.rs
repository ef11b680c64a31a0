//! Series matching and analysis.

mod analyzer;
mod matcher;

pub use analyzer::{consecutive_runs, to_report_rows, SeriesAnalyzer};
pub use matcher::{MatchOutcome, MatcherOptions, SeriesMatcher};
