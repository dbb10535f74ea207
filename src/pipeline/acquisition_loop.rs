//! The acquisition loop — an explicit state machine over sampling cycles
//!
//! Models the sample -> average -> transform -> classify -> log cycle as
//! named states with a first-class terminal state, so the stop condition
//! is a transition rather than an embedded break.
//!
//! There is no retry policy anywhere in the loop: a sensor or storage
//! failure propagates immediately, since silently continuing would produce
//! either corrupted physical data or invisible record loss.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::acquisition::{AcquisitionError, SampleEvent, SensorSource};
use crate::classify::StateClassifier;
use crate::config::MonitorConfig;
use crate::physics::PowerTransform;
use crate::storage::{CsvLogger, StorageError};
use crate::types::MeasurementRecord;

// ============================================================================
// Errors, States, Stats
// ============================================================================

/// Unrecoverable pipeline failures. Either leg is fatal to the process.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// States of one acquisition cycle. `Stopped` is terminal.
#[derive(Debug)]
pub enum LoopState {
    WindowSampling,
    RecordBuilding { avg_voltage: f64 },
    Logged { record: MeasurementRecord },
    Stopped(StopReason),
}

/// Why the loop reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured maximum record count was reached.
    RecordLimitReached,
    /// An external shutdown request (e.g. SIGINT) was observed at a cycle
    /// boundary.
    ShutdownRequested,
    /// A bounded source (replay, scripted) reported end of data.
    SourceExhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::RecordLimitReached => write!(f, "record limit reached"),
            StopReason::ShutdownRequested => write!(f, "shutdown requested"),
            StopReason::SourceExhausted => write!(f, "source exhausted"),
        }
    }
}

/// Final statistics for a completed run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStats {
    /// Records built and handed to the logger this run.
    pub records_logged: u64,
    /// Records durably written to the store (flushed).
    pub total_written: u64,
    pub stop_reason: StopReason,
}

// ============================================================================
// Acquisition Loop
// ============================================================================

/// Orchestrates sampling, transformation, classification, and logging.
///
/// Owns the sensor source and the logger; reads the immutable config by
/// reference. Consumed by [`run()`](AcquisitionLoop::run).
pub struct AcquisitionLoop<'a, S: SensorSource> {
    config: &'a MonitorConfig,
    source: S,
    transform: PowerTransform,
    classifier: StateClassifier,
    logger: CsvLogger,
    shutdown: Arc<AtomicBool>,
    records_logged: u64,
}

impl<'a, S: SensorSource> AcquisitionLoop<'a, S> {
    pub fn new(config: &'a MonitorConfig, source: S, logger: CsvLogger) -> Self {
        Self {
            config,
            source,
            transform: PowerTransform::from_config(config),
            classifier: StateClassifier::from_config(config),
            logger,
            shutdown: Arc::new(AtomicBool::new(false)),
            records_logged: 0,
        }
    }

    /// Attach a shared shutdown flag, observed at cycle boundaries.
    ///
    /// When set (e.g. from a Ctrl+C handler), the loop transitions to
    /// `Stopped` before the next window and flushes on the way out, so an
    /// orderly shutdown never discards buffered records.
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    /// Run cycles until a stop condition or an unrecoverable failure.
    pub fn run(mut self) -> Result<PipelineStats, PipelineError> {
        info!(source = self.source.source_name(), "Acquisition started");
        let mut state = LoopState::WindowSampling;

        loop {
            state = match state {
                LoopState::WindowSampling => {
                    if self.shutdown.load(Ordering::Relaxed) {
                        self.logger.flush()?;
                        LoopState::Stopped(StopReason::ShutdownRequested)
                    } else {
                        match self.sample_window()? {
                            Some(avg_voltage) => LoopState::RecordBuilding { avg_voltage },
                            // End of a bounded source: the partial window is
                            // discarded, buffered records are not.
                            None => {
                                self.logger.flush()?;
                                LoopState::Stopped(StopReason::SourceExhausted)
                            }
                        }
                    }
                }

                LoopState::RecordBuilding { avg_voltage } => {
                    let measurement = self.transform.calculate(avg_voltage);
                    let machine_state = self.classifier.classify(measurement.rms_current);
                    let record = MeasurementRecord::new(
                        Utc::now(),
                        &self.config.identity.device_id,
                        &self.config.identity.machine_id,
                        measurement,
                        self.transform.line_voltage(),
                        machine_state,
                    );
                    debug!(
                        current_rms = record.current_rms,
                        power_w = record.power_w,
                        state = %record.state,
                        "record built"
                    );
                    LoopState::Logged { record }
                }

                LoopState::Logged { record } => {
                    self.logger.log(record)?;
                    self.records_logged += 1;

                    let max = self.config.output.max_records;
                    if max > 0 && self.records_logged >= max {
                        self.logger.flush()?;
                        LoopState::Stopped(StopReason::RecordLimitReached)
                    } else {
                        let pause = self.config.sampling.pause_between_windows_s;
                        if pause > 0.0 {
                            std::thread::sleep(Duration::from_secs_f64(pause));
                        }
                        LoopState::WindowSampling
                    }
                }

                LoopState::Stopped(reason) => {
                    info!(reason = %reason, total_written = self.logger.total_written(), "Acquisition stopped");
                    return Ok(PipelineStats {
                        records_logged: self.records_logged,
                        total_written: self.logger.total_written(),
                        stop_reason: reason,
                    });
                }
            };
        }
    }

    /// Draw exactly `window_size` samples, sleeping `1/sample_rate` between
    /// consecutive samples (not before the first), and return their mean.
    ///
    /// Returns `None` when the source reports end of data, abandoning any
    /// partially drawn window. A sensor failure aborts the window with no
    /// partial record and nothing handed to the logger.
    fn sample_window(&mut self) -> Result<Option<f64>, AcquisitionError> {
        let window_size = self.config.sampling.window_size;
        let interval = Duration::from_secs_f64(1.0 / self.config.sampling.sample_rate_hz);

        let mut sum = 0.0;
        for i in 0..window_size {
            if i > 0 {
                std::thread::sleep(interval);
            }
            match self.source.sample()? {
                SampleEvent::Sample(v) => sum += v,
                SampleEvent::Eof => return Ok(None),
            }
        }
        Ok(Some(sum / window_size as f64))
    }
}
