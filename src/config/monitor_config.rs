//! Monitor configuration — calibration, sampling, and output as TOML values
//!
//! Every section implements `Default` with values matching the original
//! deployment constants, so a missing config file changes nothing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one monitoring deployment.
///
/// Load with [`MonitorConfig::load()`], which searches:
/// 1. `$CLAMPMON_CONFIG` env var
/// 2. `./clampmon.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Device / machine identification
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Electrical calibration constants
    #[serde(default)]
    pub electrical: ElectricalConfig,

    /// Sampling cadence and windowing
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Machine state classification thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// CSV output and run limits
    #[serde(default)]
    pub output: OutputConfig,
}

/// Identity metadata stamped on every record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub device_id: String,
    pub machine_id: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            device_id: "pi-001".to_string(),
            machine_id: "machine-A".to_string(),
        }
    }
}

/// Calibration constants for the clamp + amplifier chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalConfig {
    /// Amplifier gain in the voltage divider chain
    pub amplifier_gain: f64,
    /// Current clamp rating (A)
    pub ct_range_amps: f64,
    /// Assumed line voltage (V); replace with measured if available
    pub line_voltage: f64,
    /// 3 for balanced three-phase extrapolation, 1 for single-phase
    pub phases: u32,
}

impl Default for ElectricalConfig {
    fn default() -> Self {
        Self {
            amplifier_gain: 100.0,
            ct_range_amps: 50.0,
            line_voltage: 230.0,
            phases: 3,
        }
    }
}

/// Sampling cadence within and between averaging windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Individual sample rate during one averaging window (Hz)
    pub sample_rate_hz: f64,
    /// Samples averaged to produce one record
    pub window_size: usize,
    /// Optional pause after logging each window (seconds, 0 = none)
    pub pause_between_windows_s: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 50.0,
            window_size: 20,
            pause_between_windows_s: 0.0,
        }
    }
}

/// RMS current thresholds for machine state classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Below this the machine is idle (A RMS)
    pub idle_amps: f64,
    /// Above this the machine is faulted (A RMS)
    pub fault_amps: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            idle_amps: 0.5,
            fault_amps: 100.0,
        }
    }
}

/// CSV store location, flush cadence, and run limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Append-only CSV store path
    pub csv_path: PathBuf,
    /// Flush buffered records every N writes
    pub flush_interval: usize,
    /// Stop after N records; 0 = run indefinitely
    pub max_records: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("readings.csv"),
            flush_interval: 10,
            max_records: 0,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl MonitorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CLAMPMON_CONFIG` environment variable
    /// 2. `./clampmon.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// A missing file falls through with a warning; a file that parses but
    /// violates a calibration invariant is a fatal configuration fault.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("CLAMPMON_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), device = %config.identity.device_id, "Loaded config from CLAMPMON_CONFIG");
                return Ok(config);
            }
            warn!(path = %path, "CLAMPMON_CONFIG points to non-existent file, falling back");
        }

        let local = PathBuf::from("clampmon.toml");
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!(device = %config.identity.device_id, "Loaded config from ./clampmon.toml");
            return Ok(config);
        }

        info!("No clampmon.toml found — using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path and validate.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: warn about unknown keys first, then deserialize.
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate calibration invariants. Violations are fatal before any
    /// sampling begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_ranges(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_deployment_constants() {
        let c = MonitorConfig::default();
        assert_eq!(c.electrical.amplifier_gain, 100.0);
        assert_eq!(c.electrical.ct_range_amps, 50.0);
        assert_eq!(c.electrical.line_voltage, 230.0);
        assert_eq!(c.electrical.phases, 3);
        assert_eq!(c.sampling.sample_rate_hz, 50.0);
        assert_eq!(c.sampling.window_size, 20);
        assert_eq!(c.thresholds.idle_amps, 0.5);
        assert_eq!(c.thresholds.fault_amps, 100.0);
        assert_eq!(c.output.flush_interval, 10);
        assert_eq!(c.output.max_records, 0);
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let c: MonitorConfig = toml::from_str(
            r#"
            [identity]
            device_id = "pi-042"
            machine_id = "press-7"

            [thresholds]
            idle_amps = 1.0
            fault_amps = 40.0
            "#,
        )
        .unwrap();
        assert_eq!(c.identity.device_id, "pi-042");
        assert_eq!(c.thresholds.fault_amps, 40.0);
        // Untouched sections keep their defaults
        assert_eq!(c.electrical.amplifier_gain, 100.0);
        assert_eq!(c.sampling.window_size, 20);
    }
}
