//! Detect command - infer the pattern of an invoice list.

use std::path::PathBuf;

use clap::Args;
use console::style;

use docseries_core::{compile_pattern, PatternDetector};

use super::{load_config, read_input};

/// Arguments for the detect command.
#[derive(Args)]
pub struct DetectArgs {
    /// Invoice list, one per line (default: stdin)
    input: Option<PathBuf>,

    /// Use at most N unique lines (overrides config)
    #[arg(short, long)]
    sample: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn run(args: DetectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let text = read_input(args.input.as_ref())?;
    let lines: Vec<&str> = text.lines().collect();

    let detection = PatternDetector::new()
        .with_max_sample(args.sample.unwrap_or(config.detection.max_sample))
        .detect(&lines)
        .map_err(|e| anyhow::anyhow!("{}. Please enter the pattern manually.", e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&detection)?);
        return Ok(());
    }

    let spec = compile_pattern(&detection.pattern)?;

    println!("Pattern: {}", style(&detection.pattern).bold());
    println!("Confidence: {}%", detection.confidence);
    println!("Method: {}", detection.method.as_str());
    println!("Samples: {}", detection.samples);
    println!();
    println!("{}", spec.describe());

    Ok(())
}
