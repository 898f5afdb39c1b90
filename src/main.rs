//! smart-maintain - predictive maintenance analytics CLI
//!
//! Loads a sensor export and an equipment table, runs the analytics
//! pipeline once and prints the selected view as pretty JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Full processed-data contract
//! smart-maintain --sensors sensors.csv --equipment equipment.csv
//!
//! # Reproducible maintenance board as of a fixed date
//! smart-maintain --sensors sensors.json --equipment equipment.json \
//!     --seed 42 --as-of 2024-06-15 --report alerts
//!
//! # Dump the effective configuration
//! smart-maintain --print-config
//! ```
//!
//! # Environment Variables
//!
//! - `SMART_MAINTAIN_CONFIG`: Path to a `maintenance.toml` (overridden by `--config`)
//! - `RUST_LOG`: Logging level (default: info). Logs go to stderr.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use smart_maintain::alerts::{FleetSummary, MaintenanceBoard};
use smart_maintain::ingest::{load_equipment, load_sensor_readings};
use smart_maintain::{MaintenancePipeline, PipelineConfig};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "smart-maintain")]
#[command(about = "Predictive maintenance analytics for manufacturing equipment")]
#[command(version)]
struct CliArgs {
    /// Sensor readings file (.csv or .json)
    #[arg(long, value_name = "FILE", required_unless_present = "print_config")]
    sensors: Option<PathBuf>,

    /// Equipment table file (.csv or .json)
    #[arg(long, value_name = "FILE", required_unless_present = "print_config")]
    equipment: Option<PathBuf>,

    /// Pipeline config TOML. Without it, $SMART_MAINTAIN_CONFIG, then
    /// ./maintenance.toml, then built-in defaults are used.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for days-to-failure sampling (overrides prediction.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Reference date for machine age and maintenance intervals (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    as_of: Option<NaiveDate>,

    /// Which view to print
    #[arg(long, value_enum, default_value_t = Report::Full)]
    report: Report,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    /// Statistics, anomalies, predictions and recommendations
    Full,
    /// Maintenance board, most urgent first
    Alerts,
    /// Fleet headline numbers
    Summary,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &CliArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::load(),
    };
    if args.seed.is_some() {
        config.prediction.seed = args.seed;
    }
    Ok(config)
}

fn reference_time(as_of: Option<NaiveDate>) -> Result<NaiveDateTime> {
    match as_of {
        Some(date) => date
            .and_hms_opt(0, 0, 0)
            .context("Invalid --as-of date"),
        None => Ok(chrono::Local::now().naive_local()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    let config = load_config(&args)?;
    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let (Some(sensors_path), Some(equipment_path)) = (&args.sensors, &args.equipment) else {
        bail!("--sensors and --equipment are required");
    };

    let readings = load_sensor_readings(sensors_path)
        .with_context(|| format!("Failed to load sensor readings from {}", sensors_path.display()))?;
    let equipment = load_equipment(equipment_path, &config.health)
        .with_context(|| format!("Failed to load equipment from {}", equipment_path.display()))?;

    let as_of = reference_time(args.as_of)?;
    info!(
        readings = readings.len(),
        machines = equipment.len(),
        as_of = %as_of,
        seeded = config.prediction.seed.is_some(),
        "Running maintenance pipeline"
    );

    let pipeline = MaintenancePipeline::new(config);
    let processed = pipeline
        .run(&readings, &equipment, as_of)
        .context("Pipeline run failed")?;

    match args.report {
        Report::Full => print_json(&processed),
        Report::Alerts => print_json(&MaintenanceBoard::build(&processed, as_of.date())),
        Report::Summary => print_json(&FleetSummary::build(&processed)),
    }
}
