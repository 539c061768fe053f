//! Data quality assessment tool focused on Critical Data Elements.
//!
//! This binary loads a tabular dataset (CSV or JSON) and an optional CDE
//! configuration document, runs one complete quality assessment, and emits
//! the scorecard as pretty-printed JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cdeguard_core::{
    CdeRegistry, QualityAssessor, QualityThresholds, load_path, logging::init_logging,
};
use chrono::NaiveDate;
use clap::{Args, Parser};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cdeguard")]
#[command(about = "CDE-focused tabular data quality assessment")]
#[command(version)]
#[command(long_about = "
CdeGuard - Critical Data Element quality assessment

Loads one tabular dataset, profiles every column, validates it against a
rule registry, detects numeric outliers, and prints a JSON scorecard.

The CDE configuration document declares which fields are critical, whether
they may be null or must be unique, and the quality thresholds that drive
severity escalation. Without it, every column is assessed as ordinary.

EXAMPLES:
  cdeguard --data customers.csv --cde cde_config.json
  cdeguard --data events.json --as-of 2024-01-01 --output scorecard.json
  cdeguard --data customers.csv --threshold completeness:0.9,uniqueness:0.95
")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Dataset file path (.csv or .json)
    #[arg(short, long, help = "Tabular data file, CSV or JSON array of objects")]
    data: PathBuf,

    /// CDE configuration document
    #[arg(long, help = "CDE configuration JSON; omit to assess without CDEs")]
    cde: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, help = "Write the scorecard here instead of stdout")]
    output: Option<PathBuf>,

    /// Assessment reference date
    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        help = "Reference date for temporal checks; defaults to today"
    )]
    as_of: Option<NaiveDate>,

    /// Quality threshold overrides (format: metric:value)
    #[arg(
        long,
        value_delimiter = ',',
        help = "Threshold overrides (completeness:0.9,uniqueness:0.95,validity:0.85)"
    )]
    threshold: Vec<String>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, cli.global.quiet)?;

    let dataset = load_path(&cli.data)
        .with_context(|| format!("loading dataset from {}", cli.data.display()))?;

    let registry = match &cli.cde {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading CDE configuration {}", path.display()))?;
            CdeRegistry::from_json_str(&text)
                .with_context(|| format!("parsing CDE configuration {}", path.display()))?
        }
        None => {
            info!("no CDE configuration given, assessing without CDE treatment");
            CdeRegistry::default()
        }
    };

    // The only wall-clock read; the core library takes the date as input
    let reference_date = cli.as_of.unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut assessor = QualityAssessor::new(reference_date);
    if !cli.threshold.is_empty() {
        assessor = assessor.with_thresholds(parse_threshold_overrides(
            &cli.threshold,
            registry.quality_thresholds.clone(),
        ));
    }

    let scorecard = assessor
        .assess(Arc::new(dataset), Arc::new(registry))
        .await
        .context("quality assessment failed")?;

    let json = serde_json::to_string_pretty(&scorecard).context("serializing scorecard")?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing scorecard to {}", path.display()))?;
            info!(path = %path.display(), "scorecard written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Applies `metric:value` overrides on top of the registry's thresholds.
///
/// Unknown metrics and unparseable values are skipped with a warning, the
/// same forgiving treatment the positional arguments get from clap.
fn parse_threshold_overrides(overrides: &[String], base: QualityThresholds) -> QualityThresholds {
    let mut thresholds = base;
    for entry in overrides {
        let Some((metric, raw)) = entry.split_once(':') else {
            warn!(entry = entry.as_str(), "ignoring malformed threshold override");
            continue;
        };
        let Ok(value) = raw.trim().parse::<f64>() else {
            warn!(entry = entry.as_str(), "ignoring non-numeric threshold override");
            continue;
        };
        thresholds = match metric.trim() {
            "completeness" => thresholds.with_completeness(value),
            "uniqueness" => thresholds.with_uniqueness(value),
            "validity" => thresholds.with_validity(value),
            other => {
                warn!(metric = other, "ignoring unknown threshold metric");
                thresholds
            }
        };
    }
    thresholds
}
