//! Machine state classification from RMS current
//!
//! Two-threshold rule, evaluated in order: below the idle threshold the
//! machine is `idle`; above the fault threshold it is `fault`; everything
//! else — including both boundary values — is `running`.

use crate::config::MonitorConfig;
use crate::types::MachineState;

/// Threshold-based classifier over RMS current (A).
#[derive(Debug, Clone, Copy)]
pub struct StateClassifier {
    idle_threshold_amps: f64,
    fault_threshold_amps: f64,
}

impl StateClassifier {
    pub fn new(idle_threshold_amps: f64, fault_threshold_amps: f64) -> Self {
        Self {
            idle_threshold_amps,
            fault_threshold_amps,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.thresholds.idle_amps, config.thresholds.fault_amps)
    }

    /// Classify one RMS current reading.
    pub fn classify(&self, rms_current: f64) -> MachineState {
        if rms_current < self.idle_threshold_amps {
            MachineState::Idle
        } else if rms_current > self.fault_threshold_amps {
            MachineState::Fault
        } else {
            MachineState::Running
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
