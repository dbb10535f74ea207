//! Shared data structures for the clamp monitoring pipeline
//!
//! This module defines the core types that flow between components:
//! - `Measurement`: the (RMS current, power) pair produced by the transform
//! - `MachineState`: threshold-derived classification of machine activity
//! - `MeasurementRecord`: the persisted unit, one per averaging window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Machine State
// ============================================================================

/// Operating state of the monitored machine, derived solely from RMS current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    #[default]
    Idle,
    Running,
    Fault,
}

impl MachineState {
    /// Stable lowercase label used in the CSV `state` column.
    pub fn as_str(self) -> &'static str {
        match self {
            MachineState::Idle => "idle",
            MachineState::Running => "running",
            MachineState::Fault => "fault",
        }
    }
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Measurement
// ============================================================================

/// Derived electrical measurement for one averaging window.
///
/// Produced by [`PowerTransform`](crate::physics::PowerTransform); values are
/// unrounded here — rounding happens when the record is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// RMS current through the clamp (A)
    pub rms_current: f64,

    /// Extrapolated real power (W)
    pub power_w: f64,
}

// ============================================================================
// Measurement Record
// ============================================================================

/// CSV column header for the durable store. Field order is a compatibility
/// contract — new columns must append, never insert.
pub const CSV_HEADER: &str = "timestamp,device_id,machine_id,current_rms,voltage,power_w,state";

/// One persisted log entry, created once per averaging window.
///
/// Immutable after creation; ownership transfers to the logger's buffer,
/// which decides when it becomes durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// UTC timestamp, millisecond precision in the CSV output
    pub timestamp: DateTime<Utc>,

    /// Identity of the logging device (e.g. "pi-001")
    pub device_id: String,

    /// Identity of the monitored machine (e.g. "machine-A")
    pub machine_id: String,

    /// RMS current, rounded to 4 decimal places (A)
    pub current_rms: f64,

    /// Nominal line voltage, rounded to 1 decimal place (V)
    pub voltage: f64,

    /// Real power, rounded to 2 decimal places (W)
    pub power_w: f64,

    /// Classified machine state
    pub state: MachineState,
}

impl MeasurementRecord {
    /// Build a record from a window's measurement, applying the schema's
    /// rounding rules.
    pub fn new(
        timestamp: DateTime<Utc>,
        device_id: &str,
        machine_id: &str,
        measurement: Measurement,
        line_voltage: f64,
        state: MachineState,
    ) -> Self {
        Self {
            timestamp,
            device_id: device_id.to_string(),
            machine_id: machine_id.to_string(),
            current_rms: round_to(measurement.rms_current, 4),
            voltage: round_to(line_voltage, 1),
            power_w: round_to(measurement.power_w, 2),
            state,
        }
    }

    /// Render this record as one CSV row (no trailing newline).
    ///
    /// Timestamps are ISO-8601 UTC with millisecond precision and a
    /// trailing `Z`, matching the store schema.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{:.4},{:.1},{:.2},{}",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.device_id,
            self.machine_id,
            self.current_rms,
            self.voltage,
            self.power_w,
            self.state
        )
    }
}

/// Round `value` to `decimals` fractional digits (half-away-from-zero).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn state_labels_are_lowercase() {
        assert_eq!(MachineState::Idle.as_str(), "idle");
        assert_eq!(MachineState::Running.as_str(), "running");
        assert_eq!(MachineState::Fault.as_str(), "fault");
    }

    #[test]
    fn round_to_applies_schema_precision() {
        assert_eq!(round_to(0.353_553_390_6, 4), 0.3536);
        assert_eq!(round_to(243.951_84, 2), 243.95);
        assert_eq!(round_to(230.0, 1), 230.0);
    }

    #[test]
    fn record_rounds_on_construction() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let m = Measurement {
            rms_current: 0.353_553_390_6,
            power_w: 243.951_839_1,
        };
        let rec = MeasurementRecord::new(ts, "pi-001", "machine-A", m, 230.0, MachineState::Idle);
        assert_eq!(rec.current_rms, 0.3536);
        assert_eq!(rec.power_w, 243.95);
        assert_eq!(rec.voltage, 230.0);
    }

    #[test]
    fn csv_row_matches_schema_order() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        let m = Measurement {
            rms_current: 0.3536,
            power_w: 243.95,
        };
        let rec =
            MeasurementRecord::new(ts, "pi-001", "machine-A", m, 230.0, MachineState::Running);
        assert_eq!(
            rec.to_csv_row(),
            "2024-03-01T12:00:00.250Z,pi-001,machine-A,0.3536,230.0,243.95,running"
        );
    }

    #[test]
    fn header_order_is_the_compatibility_contract() {
        assert_eq!(
            CSV_HEADER,
            "timestamp,device_id,machine_id,current_rms,voltage,power_w,state"
        );
    }
}
