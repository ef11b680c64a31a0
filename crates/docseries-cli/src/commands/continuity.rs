//! Continuity command - compare series with the previous return.

use std::path::PathBuf;

use clap::Args;
use console::style;

use docseries_core::report::format_continuity_report;
use docseries_core::{check_continuity, process, ContinuitySummary, TaxPeriod};

use super::{load_config, load_previous, read_input};

/// Arguments for the continuity command.
#[derive(Args)]
pub struct ContinuityArgs {
    /// Current invoice list, one per line (default: stdin)
    input: Option<PathBuf>,

    /// Invoice pattern, e.g. "GST/*/[001]"
    #[arg(short, long)]
    pattern: String,

    /// Previous period series (CSV)
    #[arg(long)]
    previous: PathBuf,

    /// Current tax period (MMYYYY)
    #[arg(long)]
    period: String,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn run(args: ContinuityArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if let Err(e) = TaxPeriod::parse(&args.period) {
        eprintln!(
            "{} {}; previous series of every financial year will be compared.",
            style("⚠").yellow(),
            e
        );
    }

    let previous = load_previous(&args.previous)?;
    let text = read_input(args.input.as_ref())?;
    let result = process(&args.pattern, &text, &config.report.default_nature, &config)?;
    let results = check_continuity(&previous, &result.series_results, &args.period);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("{}", format_continuity_report(&results));

    let summary = ContinuitySummary::from_results(&results);
    if summary.gaps + summary.overlaps > 0 {
        println!(
            "{} {} series need attention",
            style("⚠").yellow(),
            summary.gaps + summary.overlaps
        );
    } else {
        println!("{} No numbering breaks found", style("✓").green());
    }

    Ok(())
}
