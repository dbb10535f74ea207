//! Monitor Configuration Module
//!
//! Per-deployment calibration and identity loaded from TOML, replacing the
//! original hardcoded constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `CLAMPMON_CONFIG` environment variable (path to TOML file)
//! 2. `clampmon.toml` in the current working directory
//! 3. Built-in defaults (matching the original deployment constants)
//!
//! The validated config is an immutable value passed by reference into
//! every component constructor — there is deliberately no global config
//! singleton.

mod monitor_config;
pub mod validation;

pub use monitor_config::*;
