//! Analyze command - summarize invoice series for Table 13.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use docseries_core::report::{format_continuity_report, format_result_summary, format_table13_tsv};
use docseries_core::{
    check_continuity, process, ContinuityResult, DocSeriesConfig, DocumentNature, PatternDetector,
    ProcessingResult, Table13Row, TABLE13_HEADERS,
};

use super::{load_config, load_previous, print_warnings, read_input, write_output};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Invoice list, one per line (default: stdin)
    input: Option<PathBuf>,

    /// Invoice pattern, e.g. "GST/*/[001]"
    #[arg(short, long, required_unless_present = "detect", conflicts_with = "detect")]
    pattern: Option<String>,

    /// Detect the pattern from the input
    #[arg(long)]
    detect: bool,

    /// Nature of document (see `docseries natures`)
    #[arg(short, long)]
    nature: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Previous period series (CSV) for a continuity check
    #[arg(long, requires = "period")]
    previous: Option<PathBuf>,

    /// Current tax period (MMYYYY)
    #[arg(long)]
    period: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table 13 rows as CSV
    Csv,
    /// Table 13 rows as tab-separated values
    Tsv,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct AnalyzeReport<'a> {
    result: &'a ProcessingResult,
    table13: Vec<Table13Row>,
    #[serde(skip_serializing_if = "Option::is_none")]
    continuity: Option<&'a [ContinuityResult]>,
}

pub fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let text = read_input(args.input.as_ref())?;
    let nature = resolve_nature(args.nature.as_deref(), &config)?;

    let pattern = match args.pattern {
        Some(pattern) => pattern,
        None => detect_from_input(&text, &config)?,
    };
    debug!("Using pattern {:?}", pattern);

    let result = process(&pattern, &text, nature.label(), &config)?;
    let rows = docseries_core::to_report_rows(&result);

    let continuity = match (&args.previous, &args.period) {
        (Some(previous), Some(period)) => {
            let previous = load_previous(previous)?;
            Some(check_continuity(&previous, &result.series_results, period))
        }
        _ => None,
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&AnalyzeReport {
            result: &result,
            table13: rows,
            continuity: continuity.as_deref(),
        })?,
        OutputFormat::Csv => format_csv(&rows)?,
        OutputFormat::Tsv => format_table13_tsv(&rows),
        OutputFormat::Text => {
            let mut summary = format_result_summary(&result, config.analysis.max_missing_display);
            if let Some(continuity) = &continuity {
                summary.push_str("\n\n");
                summary.push_str(&format_continuity_report(continuity));
            }
            summary
        }
    };

    if !matches!(args.format, OutputFormat::Text) {
        print_warnings(
            result
                .warnings
                .iter()
                .chain(result.series_results.iter().flat_map(|s| s.warnings.iter())),
        );
    }

    write_output(args.output.as_ref(), &output)?;

    info!(
        "{} series from {} line(s)",
        result.series_results.len(),
        result.total_input_lines
    );
    Ok(())
}

fn resolve_nature(nature: Option<&str>, config: &DocSeriesConfig) -> anyhow::Result<DocumentNature> {
    let label = nature.unwrap_or(&config.report.default_nature);
    label.parse::<DocumentNature>().map_err(|e| {
        anyhow::anyhow!("{}. Run 'docseries natures' to list accepted values.", e)
    })
}

fn detect_from_input(text: &str, config: &DocSeriesConfig) -> anyhow::Result<String> {
    let lines: Vec<&str> = text.lines().collect();
    let detection = PatternDetector::new()
        .with_max_sample(config.detection.max_sample)
        .detect(&lines)?;

    eprintln!(
        "{} Detected pattern {} ({}% confidence)",
        style("ℹ").blue(),
        style(&detection.pattern).bold(),
        detection.confidence
    );
    Ok(detection.pattern)
}

fn format_csv(rows: &[Table13Row]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(TABLE13_HEADERS)?;
    for row in rows {
        wtr.write_record(row.to_record())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
