//! Synthetic clamp source for hardware-free runs
//!
//! Emulates a machine that alternates between idle and load: the emitted
//! voltage sits near a base level for a stretch of samples, then steps up
//! to a load level, with small random jitter on every read. Useful for
//! bench runs, demos, and soak-testing the logging path.

use rand::Rng;

use super::{AcquisitionError, SampleEvent, SensorSource};

/// ADC reference voltage emulated by the synthetic source (V).
pub const SYNTHETIC_VREF: f64 = 3.3;

/// Duty-cycle waveform generator standing in for a real clamp + ADC.
pub struct SyntheticClamp {
    idle_volts: f64,
    load_volts: f64,
    /// Samples spent in each half of the duty cycle.
    half_cycle: usize,
    position: usize,
}

impl SyntheticClamp {
    pub fn new(idle_volts: f64, load_volts: f64, half_cycle: usize) -> Self {
        Self {
            idle_volts,
            load_volts,
            half_cycle: half_cycle.max(1),
            position: 0,
        }
    }
}

impl Default for SyntheticClamp {
    /// Defaults chosen so a 100x-gain / 50 A calibration classifies the
    /// idle half below 0.5 A RMS and the load half well above it.
    fn default() -> Self {
        // 0.5 V -> ~0.18 A RMS (idle); 2.5 V -> ~0.88 A RMS (running)
        Self::new(0.5, 2.5, 200)
    }
}

impl SensorSource for SyntheticClamp {
    fn sample(&mut self) -> Result<SampleEvent, AcquisitionError> {
        let base = if (self.position / self.half_cycle) % 2 == 0 {
            self.idle_volts
        } else {
            self.load_volts
        };
        self.position = self.position.wrapping_add(1);

        let jitter: f64 = rand::thread_rng().gen_range(-0.02..0.02);
        Ok(SampleEvent::Sample((base + jitter).clamp(0.0, SYNTHETIC_VREF)))
    }

    fn source_name(&self) -> &str {
        "synthetic"
    }
}
