//! Subcommands and the input/output plumbing they share.

pub mod analyze;
pub mod config;
pub mod continuity;
pub mod detect;
pub mod natures;
pub mod period;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;
use tracing::{debug, info};

use docseries_core::{DocSeriesConfig, PreviousSeriesInfo, PreviousSeriesRecord};

/// Load the config given with `--config`, else the default file if present.
pub fn load_config(path: Option<&str>) -> anyhow::Result<DocSeriesConfig> {
    if let Some(path) = path {
        return DocSeriesConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(DocSeriesConfig::from_file(&default_path)?)
    } else {
        Ok(DocSeriesConfig::default())
    }
}

/// Read invoice text from a file, or stdin when absent or `-`.
pub fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            info!("Reading invoices from {}", path.display());
            Ok(fs::read_to_string(path)?)
        }
        _ => {
            info!("Reading invoices from stdin");
            Ok(io::read_to_string(io::stdin())?)
        }
    }
}

/// Load previous-period series from a CSV export.
///
/// Expected columns: `doc_type`, `from`, `to`, `total`, `cancelled`,
/// `tax_period`. Portal headers (`Doc Type`, `From`, `To`, ...) are
/// accepted too.
pub fn load_previous(path: &Path) -> anyhow::Result<Vec<PreviousSeriesInfo>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open previous series file {}", path.display()))?;

    let mut series = Vec::new();
    for (i, record) in reader.deserialize::<PreviousSeriesRecord>().enumerate() {
        let record =
            record.with_context(|| format!("Invalid row {} in {}", i + 2, path.display()))?;
        if record.to_invoice.is_empty() {
            continue;
        }
        series.push(PreviousSeriesInfo::from(record));
    }

    info!("Loaded {} previous series from {}", series.len(), path.display());
    Ok(series)
}

/// Write to a file, or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    if let Some(output_path) = output {
        fs::write(output_path, content)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Print advisory warnings to stderr.
pub fn print_warnings<'a>(warnings: impl IntoIterator<Item = &'a String>) {
    for warning in warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
}
