//! Sensor data acquisition
//!
//! Defines the [`SensorSource`] seam every ADC driver implements, plus the
//! bundled sources: a synthetic clamp waveform for hardware-free runs, a
//! voltage-trace replay source, and a deterministic scripted source for
//! tests.
//!
//! A real hardware driver (e.g. an MCP3008 over SPI) lives outside this
//! crate and only needs to satisfy the single `sample()` method. Hardware
//! sources never report [`SampleEvent::Eof`]; only bounded sources (replay,
//! scripted) do, and the acquisition loop treats it as an orderly stop.

pub mod replay;
pub mod synthetic;

pub use replay::ReplaySource;
pub use synthetic::SyntheticClamp;

use thiserror::Error;

/// Acquisition failures. All variants are fatal to the running process —
/// substituting a synthetic reading would corrupt the physical measurement.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("sensor read failed: {0}")]
    ReadFailed(String),

    #[error("sensor reading {value:.4} V outside [0, {reference:.2}] V")]
    OutOfRange { value: f64, reference: f64 },

    #[error("sensor I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one sensor read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleEvent {
    /// A valid normalized voltage sample (V).
    Sample(f64),
    /// The source has no more data. Bounded sources only; a functioning
    /// hardware sensor never exhausts.
    Eof,
}

/// Something that yields one normalized voltage sample per call.
///
/// Sampled values are voltages in `[0, V_ref]` where `V_ref` is the
/// device's reference voltage. Implementations validate their own range;
/// an out-of-range reading is a hardware fault, never clamped or dropped.
pub trait SensorSource {
    /// Blocking read of one voltage sample, or `Eof` when a bounded
    /// source is exhausted.
    fn sample(&mut self) -> Result<SampleEvent, AcquisitionError>;

    /// Human-readable name for logging (e.g. "synthetic", "replay").
    fn source_name(&self) -> &str;
}

// ============================================================================
// Scripted Source (deterministic, for tests)
// ============================================================================

/// In-memory source that yields a fixed voltage sequence in order, then
/// reports `Eof`.
///
/// Supports injecting a hardware fault after a set number of successful
/// reads, for exercising the loop's failure path.
pub struct ScriptedSource {
    samples: std::collections::VecDeque<f64>,
    fail_after: Option<usize>,
    reads: usize,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            fail_after: None,
            reads: 0,
        }
    }

    /// Return a hardware fault after `n` successful reads.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl SensorSource for ScriptedSource {
    fn sample(&mut self) -> Result<SampleEvent, AcquisitionError> {
        if let Some(n) = self.fail_after {
            if self.reads >= n {
                return Err(AcquisitionError::ReadFailed(
                    "injected hardware fault".to_string(),
                ));
            }
        }
        match self.samples.pop_front() {
            Some(v) => {
                self.reads += 1;
                Ok(SampleEvent::Sample(v))
            }
            None => Ok(SampleEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "scripted"
    }
}
