//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use docseries_core::DocSeriesConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "analysis.large_gap_threshold")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or plain text for strings)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let target = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show(&target),
        ConfigCommand::Init(init) => init_file(init.output.unwrap_or(target), init.force),
        ConfigCommand::Get { key } => get(&target, &key),
        ConfigCommand::Set { key, value } => set(&target, &key, &value),
        ConfigCommand::Path => path_status(&target),
    }
}

/// `<config dir>/docseries/config.json`.
pub fn default_config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("docseries").join("config.json")
}

fn load_or_default(path: &Path) -> anyhow::Result<DocSeriesConfig> {
    if !path.exists() {
        return Ok(DocSeriesConfig::default());
    }
    DocSeriesConfig::from_file(path)
        .with_context(|| format!("Failed to read config {}", path.display()))
}

fn save(config: &DocSeriesConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    config
        .save(path)
        .with_context(|| format!("Failed to write config {}", path.display()))
}

fn show(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!(
            "{} {} does not exist, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }
    let config = load_or_default(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_file(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }
    save(&DocSeriesConfig::default(), &path)?;
    println!("{} Wrote default configuration to {}", style("✓").green(), path.display());
    Ok(())
}

fn get(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default(path)?)?;
    let Some(value) = lookup(&json, key) else {
        bail!("Unknown configuration key: {}", key);
    };
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    // Non-JSON input is taken as a plain string.
    let value: Value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let mut json = serde_json::to_value(load_or_default(path)?)?;
    assign(&mut json, key, value.clone())?;

    let updated: DocSeriesConfig = serde_json::from_value(json)
        .with_context(|| format!("Invalid value for {}", key))?;
    save(&updated, path)?;

    println!("{} {} = {}", style("✓").green(), key, value);
    Ok(())
}

fn path_status(path: &Path) -> anyhow::Result<()> {
    println!("{}", path.display());
    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!("Run 'docseries config init' to create it.");
    }
    Ok(())
}

/// Follow a dotted key path.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at an existing dotted key path.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let slot = key
        .split('.')
        .try_fold(json, |current, part| current.get_mut(part));
    match slot {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => bail!("Unknown configuration key: {}", key),
    }
}
