//! Period command - financial-year details of a tax period.

use clap::Args;
use console::style;

use docseries_core::fy::recent_periods;
use docseries_core::TaxPeriod;

/// Arguments for the period command.
#[derive(Args)]
pub struct PeriodArgs {
    /// Tax period as MMYYYY (default: current month)
    period: Option<String>,

    /// Also list the N periods ending at this one
    #[arg(long)]
    recent: Option<usize>,
}

pub fn run(args: PeriodArgs) -> anyhow::Result<()> {
    let period = match &args.period {
        Some(p) => TaxPeriod::parse(p)?,
        None => TaxPeriod::current()?,
    };
    let fy = period.financial_year();

    println!("Period: {} ({})", style(period.display()).bold(), period);
    println!("Financial year: FY {}", fy);
    if period.is_fy_boundary() {
        println!("{} First month of the financial year", style("ℹ").blue());
    }

    if let Some(count) = args.recent {
        println!();
        for p in recent_periods(period, count) {
            println!("  {}  {:<15} FY {}", p, p.display(), p.financial_year());
        }
    }

    Ok(())
}
