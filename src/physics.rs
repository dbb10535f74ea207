//! Clamp voltage to electrical measurement transform
//!
//! Implements the calibration chain:
//! averaged ADC voltage -> amplifier input voltage -> clamp current ->
//! RMS current -> extrapolated power.
//!
//! The power figure multiplies a single measured phase's RMS current by the
//! configured phase count, assuming a balanced sinusoidal load. This is a
//! documented extrapolation, not an independent polyphase measurement.

use std::f64::consts::FRAC_1_SQRT_2;

use crate::config::MonitorConfig;
use crate::types::Measurement;

/// Pure transform from an averaged window voltage to (RMS current, power).
///
/// Calibration constants are captured at construction and never change for
/// the life of the process.
#[derive(Debug, Clone, Copy)]
pub struct PowerTransform {
    amplifier_gain: f64,
    ct_range_amps: f64,
    line_voltage: f64,
    phases: u32,
}

impl PowerTransform {
    pub fn new(amplifier_gain: f64, ct_range_amps: f64, line_voltage: f64, phases: u32) -> Self {
        Self {
            amplifier_gain,
            ct_range_amps,
            line_voltage,
            phases,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.electrical.amplifier_gain,
            config.electrical.ct_range_amps,
            config.electrical.line_voltage,
            config.electrical.phases,
        )
    }

    /// Apply the calibration chain to one averaged window voltage.
    ///
    /// Pure arithmetic over finite floats; NaN or negative inputs pass
    /// through unfiltered — the sensor contract guarantees physically
    /// valid voltages.
    pub fn calculate(&self, avg_voltage: f64) -> Measurement {
        let amplifier_voltage_in = avg_voltage / self.amplifier_gain;
        let clamp_current = amplifier_voltage_in * self.ct_range_amps;
        let rms_current = clamp_current * FRAC_1_SQRT_2;
        let power_w = f64::from(self.phases) * rms_current * self.line_voltage;
        Measurement {
            rms_current,
            power_w,
        }
    }

    /// Nominal line voltage this transform assumes (V).
    pub fn line_voltage(&self) -> f64 {
        self.line_voltage
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_transform() -> PowerTransform {
        PowerTransform::new(100.0, 50.0, 230.0, 3)
    }

    #[test]
    fn worked_example_matches_calibration_chain() {
        let m = reference_transform().calculate(1.0);
        // 1.0 / 100 = 0.01 V; 0.01 * 50 = 0.5 A; 0.5 / sqrt(2) ~= 0.35355 A
        assert!((m.rms_current - 0.353_553_390_6).abs() < 1e-9);
        // 3 * 0.35355 * 230 ~= 243.95 W
        assert!((m.power_w - 243.951_839_2).abs() < 1e-4);
    }

    #[test]
    fn power_is_exactly_phases_times_rms_times_voltage() {
        let t = reference_transform();
        for v in [0.0, 0.1, 0.5, 1.0, 2.5, 3.3] {
            let m = t.calculate(v);
            assert_eq!(m.power_w, 3.0 * m.rms_current * 230.0);
        }
    }

    #[test]
    fn transform_is_monotonic_in_input_voltage() {
        let t = reference_transform();
        let mut prev = t.calculate(0.0);
        for i in 1..=33 {
            let m = t.calculate(f64::from(i) * 0.1);
            assert!(m.rms_current >= prev.rms_current);
            assert!(m.power_w >= prev.power_w);
            prev = m;
        }
    }

    #[test]
    fn zero_input_yields_zero_output() {
        let m = reference_transform().calculate(0.0);
        assert_eq!(m.rms_current, 0.0);
        assert_eq!(m.power_w, 0.0);
    }
}
