//! corestat: per-core CPU busy and iowait monitor.
//!
//! Polls the kernel's CPU accounting counters on a fixed interval and
//! prints per-core busy and iowait percentages to stdout, either as a
//! human-readable block or as comma-separated rows for ingestion.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use corestat_core::{format, GlobalConfig, OutputFormat, StatReader, UtilizationEngine};
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::process;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

/// Command-line arguments for the monitor.
#[derive(Parser)]
#[command(name = "corestat")]
#[command(about = "Per-core CPU busy/iowait monitor")]
#[command(version)]
struct Args {
    /// Poll interval in seconds (minimum 1)
    #[arg(short, long, value_parser = validate_interval)]
    interval: Option<u64>,

    /// Output format (human, csv)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Core count to size baselines for; the warning about extra visible
    /// cores is measured against this (default: available parallelism)
    #[arg(long)]
    expected_cores: Option<usize>,

    /// One-shot mode (sample one interval, print one batch and exit)
    #[arg(short, long)]
    once: bool,

    /// Verify the accounting source is readable and exit
    #[arg(long)]
    check: bool,

    /// Generate example config file and exit
    #[arg(long)]
    generate_config: bool,
}

/// Validate that the interval is at least one second.
fn validate_interval(s: &str) -> Result<u64, String> {
    let interval = s
        .parse::<u64>()
        .map_err(|_| "Interval must be a positive integer".to_owned())?;

    if interval < GlobalConfig::MIN_INTERVAL_SECS {
        return Err(format!(
            "Interval must be at least {} second(s)",
            GlobalConfig::MIN_INTERVAL_SECS
        ));
    }

    Ok(interval)
}

/// Cores visible to this process, used when `--expected-cores` is absent.
fn default_core_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn warn_core_growth(engine: &UtilizationEngine) {
    warn!(
        expected = engine.expected_cores(),
        visible = engine.tracked_rows() - 1,
        "more cpu rows than expected; container cpu limits may not match the host"
    );
}

/// Main entry point for the monitor.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version are not errors; anything else is usage
            // misuse and exits with status 1.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    // Handle config generation
    if args.generate_config {
        let config_path =
            GlobalConfig::default_config_path().context("Could not determine config directory")?;
        GlobalConfig::save_example_config_to_file(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("Generated example config at: {}", config_path.display());
        return Ok(());
    }

    let reader = StatReader::new();

    // Check availability if requested
    if args.check {
        match reader.check_availability() {
            Ok(()) => {
                println!("{} is readable", reader.path().display());
                return Ok(());
            }
            Err(e) => {
                eprintln!("CPU accounting source is not available: {e}");
                process::exit(1);
            }
        }
    }

    // Load the config file and apply command line overrides
    let config = GlobalConfig::load().unwrap_or_else(|err| {
        warn!(%err, "ignoring unreadable config file, using defaults");
        GlobalConfig::default()
    });
    let interval_secs = args.interval.unwrap_or(config.interval);
    let output_format = args.format.unwrap_or(config.format);
    let expected_cores = args.expected_cores.unwrap_or_else(default_core_count);

    let mut engine = UtilizationEngine::new(expected_cores);
    info!(
        expected_cores,
        interval_secs,
        %output_format,
        "monitoring cpu utilization"
    );

    if args.once {
        // One-shot mode still needs two snapshots one interval apart to
        // have something to measure.
        let first = reader
            .read()
            .context("Failed to read CPU accounting counters")?;
        let warmup = engine.compute(&first);

        time::sleep(Duration::from_secs(interval_secs)).await;

        let second = reader
            .read()
            .context("Failed to read CPU accounting counters")?;
        let report = engine.compute(&second);
        // The growth transition is flagged once; with extra rows visible
        // from the start it lands on the warm-up report.
        if warmup.core_count_changed || report.core_count_changed {
            warn_core_growth(&engine);
        }

        print!(
            "{}",
            format::render(&report, &format::timestamp(Local::now()), output_format)
        );
        io::stdout().flush()?;
        return Ok(());
    }

    // Continuous mode: poll forever, skipping cycles that fail to read
    let mut interval = time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let snapshot = match reader.read() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                // The source may become readable again, keep polling
                error!(%err, "skipping poll cycle");
                continue;
            }
        };

        let report = engine.compute(&snapshot);
        if report.core_count_changed {
            warn_core_growth(&engine);
        }

        let batch = format::render(&report, &format::timestamp(Local::now()), output_format);
        if !batch.is_empty() {
            print!("{batch}");
            io::stdout().flush()?;
        }
    }
}
