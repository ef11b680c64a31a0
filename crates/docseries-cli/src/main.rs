//! CLI application for GSTR-1 Table 13 document series summaries.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{analyze, config, continuity, detect, natures, period};

/// Invoice series analysis - ranges, cancellations and continuity for GSTR-1 Table 13
#[derive(Parser)]
#[command(name = "docseries")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize invoice series for Table 13
    Analyze(analyze::AnalyzeArgs),

    /// Detect the pattern of an invoice list
    Detect(detect::DetectArgs),

    /// Check numbering continuity against the previous return
    Continuity(continuity::ContinuityArgs),

    /// Show financial-year details of a tax period
    Period(period::PeriodArgs),

    /// List accepted document natures
    Natures,

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Analyze(args) => analyze::run(args, config_path),
        Commands::Detect(args) => detect::run(args, config_path),
        Commands::Continuity(args) => continuity::run(args, config_path),
        Commands::Period(args) => period::run(args),
        Commands::Natures => natures::run(),
        Commands::Config(args) => config::run(args, config_path),
    }
}
