//! clampmon - current-clamp power monitoring daemon
//!
//! Long-running foreground acquisition process: samples a clamp sensor,
//! derives RMS current and power per averaging window, classifies the
//! machine state, and appends records to a local CSV store.
//!
//! # Usage
//!
//! ```bash
//! # Run against the built-in synthetic clamp (no hardware needed)
//! cargo run --release
//!
//! # Replay a captured voltage trace
//! cargo run --release -- --replay traces/press-7.txt
//!
//! # Bounded bench run with an explicit store
//! cargo run --release -- --max-records 100 --store /tmp/readings.csv
//! ```
//!
//! # Environment Variables
//!
//! - `CLAMPMON_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use clampmon::acquisition::{ReplaySource, SensorSource, SyntheticClamp};
use clampmon::pipeline::{AcquisitionLoop, PipelineStats};
use clampmon::storage::CsvLogger;
use clampmon::MonitorConfig;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "clampmon")]
#[command(about = "Current-clamp power monitoring daemon")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides the standard search order)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the CSV store path from the config
    #[arg(long)]
    store: Option<PathBuf>,

    /// Override the maximum record count (0 = run indefinitely)
    #[arg(long)]
    max_records: Option<u64>,

    /// Replay a captured voltage trace file instead of the synthetic clamp
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,

    /// ADC reference voltage for replay range checking (V)
    #[arg(long, default_value = "3.3")]
    vref: f64,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    // Load configuration — an invalid config is fatal before any sampling
    let mut config = match &args.config {
        Some(path) => MonitorConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MonitorConfig::load().context("loading configuration")?,
    };
    if let Some(store) = args.store {
        config.output.csv_path = store;
    }
    if let Some(n) = args.max_records {
        config.output.max_records = n;
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  clampmon - Current Clamp Power Monitor");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!(
        "Device: {} | Machine: {} | Store: {}",
        config.identity.device_id,
        config.identity.machine_id,
        config.output.csv_path.display()
    );
    info!(
        "Gain: {} | CT: {} A | Phases: {} | Vline: {} V",
        config.electrical.amplifier_gain,
        config.electrical.ct_range_amps,
        config.electrical.phases,
        config.electrical.line_voltage
    );
    info!(
        "Sampling: {} Hz x {} samples/window | Flush every {} records | Max: {}",
        config.sampling.sample_rate_hz,
        config.sampling.window_size,
        config.output.flush_interval,
        if config.output.max_records == 0 {
            "unbounded".to_string()
        } else {
            config.output.max_records.to_string()
        }
    );

    // Graceful shutdown via Ctrl+C: the loop observes the flag at cycle
    // boundaries and flushes on the way out.
    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("🛑 Received Ctrl+C, stopping after the current cycle...");
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("installing Ctrl+C handler")?;

    // Dispatch with the appropriate sensor source
    let stats = if let Some(trace) = &args.replay {
        info!("📥 Input: voltage trace replay ({})", trace.display());
        let source = ReplaySource::from_file(trace, args.vref)
            .with_context(|| format!("loading trace from {}", trace.display()))?;
        run_monitor(source, &config, shutdown)?
    } else {
        info!("📥 Input: synthetic clamp (no hardware)");
        run_monitor(SyntheticClamp::default(), &config, shutdown)?
    };

    info!(
        "✓ Wrote {} records ({}) -> {}",
        stats.total_written,
        stats.stop_reason,
        config.output.csv_path.display()
    );
    Ok(())
}

/// Open the store and drive the acquisition loop to completion.
fn run_monitor<S: SensorSource>(
    source: S,
    config: &MonitorConfig,
    shutdown: Arc<AtomicBool>,
) -> Result<PipelineStats> {
    let logger = CsvLogger::open(&config.output.csv_path, config.output.flush_interval)
        .context("opening CSV store")?;
    let stats = AcquisitionLoop::new(config, source, logger)
        .with_shutdown_flag(shutdown)
        .run()
        .context("acquisition loop failed")?;
    Ok(stats)
}
