//! TripStat - Trip Statistics Calculator
//!
//! A CLI tool that computes fleet statistics from trip data JSON and
//! generates a step-by-step mathematical explanation of every number.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input, unreadable file, config failure, etc.)

mod analysis;
mod cli;
mod config;
mod format;
mod input;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use format::{format_value, ValueKind};
use models::{DistanceUnit, Report, ReportMetadata, Statistics};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("TripStat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the calculation
    match run_report(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report generation failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tripstat.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".tripstat.toml");

    if path.exists() {
        eprintln!("⚠️  .tripstat.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .tripstat.toml")?;

    println!("✅ Created .tripstat.toml with default settings.");
    println!("   Edit it to customize output, units, and report format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete calculation workflow. Returns exit code (0).
fn run_report(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Resolve display settings from the merged config. Unknown unit and
    // format selectors fall back to km/text rather than failing.
    let unit = DistanceUnit::parse(&config.units.distance);
    let output_format = OutputFormat::parse_lenient(&config.report.format);
    let output = PathBuf::from(&config.general.output);
    debug!("Distance unit: {}, report format: {:?}", unit, output_format);

    // Step 1: Load the trip data
    let trips = if args.sample {
        println!("🧪 Loading built-in sample data");
        input::sample_trips()?
    } else {
        let input_path = args.input.clone().unwrap_or_else(|| PathBuf::from("-"));
        if input_path == PathBuf::from("-") {
            println!("📥 Reading trip data from stdin");
        } else {
            println!("📥 Reading trip data: {}", input_path.display());
        }
        input::load_trips(&input_path)?
    };
    info!("Loaded {} trip records", trips.len());

    // Step 2: Calculate the statistics
    println!("🔢 Calculating statistics for {} trip records...", trips.len());
    let stats = analysis::calculate_statistics(&trips);

    // Step 3: Generate the calculation explanation
    println!("📝 Generating calculation explanation...");
    let explanation = report::generate_explanation_report(&trips, &stats, unit);

    let duration = start_time.elapsed().as_secs_f64();

    // Step 4: Render and write the report
    let content = match output_format {
        OutputFormat::Text => explanation,
        OutputFormat::Json => {
            let report = Report {
                metadata: ReportMetadata {
                    generated_at: Utc::now(),
                    tool_version: env!("CARGO_PKG_VERSION").to_string(),
                    trip_count: trips.len(),
                    distance_unit: unit,
                    duration_seconds: duration,
                },
                statistics: stats.clone(),
                explanation: config.report.include_explanation.then_some(explanation),
            };
            report::generate_json_report(&report)?
        }
    };

    report::write_report(&content, &output)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    // Print the statistics summary
    print_summary(&stats, unit);

    println!("\n✅ Report saved to: {}", output.display());

    Ok(0)
}

/// Print the statistics summary grid to the console.
fn print_summary(stats: &Statistics, unit: DistanceUnit) {
    println!("\n📊 Statistics Summary:");

    let rows = [
        ("Planned Trucks".to_string(), f64::from(stats.planned_trucks), ValueKind::Integer),
        ("Number of Trips".to_string(), f64::from(stats.number_of_trips), ValueKind::Integer),
        ("Planned Orders".to_string(), f64::from(stats.planned_orders), ValueKind::Integer),
        (
            "Preplanned Orders".to_string(),
            f64::from(stats.preplanned_orders),
            ValueKind::Integer,
        ),
        (
            "Unplanned Trucks".to_string(),
            f64::from(stats.un_planned_trucks),
            ValueKind::Integer,
        ),
        (
            "Unplanned Must-Go's".to_string(),
            f64::from(stats.unplanned_must_gos),
            ValueKind::Integer,
        ),
        ("Total Volume (L)".to_string(), stats.total_volume, ValueKind::Number),
        (
            "Total Volume VMI Orders (L)".to_string(),
            stats.total_volume_vmi,
            ValueKind::Number,
        ),
        (
            "Total Volume Non-VMI Orders (L)".to_string(),
            stats.total_volume_non_vmi,
            ValueKind::Number,
        ),
        (
            "Unplanned Non-VMI Volume (L)".to_string(),
            stats.unplanned_non_vmi_volume,
            ValueKind::Number,
        ),
        (
            "Average Payload Utilization".to_string(),
            stats.average_payload_utilization,
            ValueKind::Percentage,
        ),
        (
            "Average Shift Utilization".to_string(),
            stats.average_shift_utilization,
            ValueKind::Percentage,
        ),
        (
            "Average Unplanned Time per Truck (min)".to_string(),
            stats.average_unplanned_time_per_truck,
            ValueKind::Decimal,
        ),
        (
            "Average Number of Drops".to_string(),
            stats.average_number_of_drops,
            ValueKind::Decimal,
        ),
        ("Total Used Time".to_string(), stats.total_used_time, ValueKind::Time),
        ("Delay".to_string(), stats.delay, ValueKind::Time),
        (
            format!("Total Used Distance ({})", unit.label()),
            stats.total_used_kms,
            ValueKind::Distance,
        ),
        (
            format!("Way Back Distance ({})", unit.label()),
            stats.way_back_km,
            ValueKind::Distance,
        ),
        (unit.per_volume_label().to_string(), stats.km_per_m3, ValueKind::DistanceDecimal),
        ("m³/hour".to_string(), stats.m3_per_hour, ValueKind::Decimal),
    ];

    for (label, value, kind) in rows {
        println!("   {:<40} {}", label, format_value(Some(value), kind, unit));
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .tripstat.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
