//! clampmon: current-clamp power monitoring daemon
//!
//! Continuously samples an analog clamp sensor, averages fixed-size windows
//! of raw voltage samples, derives (RMS current, real power) through a
//! calibration chain, classifies the monitored machine's state from two
//! current thresholds, and durably appends each result to a CSV store with
//! buffered flush.
//!
//! ## Architecture
//!
//! - **Acquisition**: [`acquisition::SensorSource`] seam plus bundled
//!   synthetic / replay / scripted sources
//! - **Physics**: [`physics::PowerTransform`] calibration chain
//! - **Classification**: [`classify::StateClassifier`] two-threshold rule
//! - **Storage**: [`storage::CsvLogger`] buffered append-only writer
//! - **Pipeline**: [`pipeline::AcquisitionLoop`] explicit cycle state machine

pub mod acquisition;
pub mod classify;
pub mod config;
pub mod physics;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-export the configuration root
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{MachineState, Measurement, MeasurementRecord, CSV_HEADER};

// Re-export the pipeline surface
pub use pipeline::{AcquisitionLoop, PipelineError, PipelineStats, StopReason};

// Re-export component constructors
pub use classify::StateClassifier;
pub use physics::PowerTransform;
pub use storage::{CsvLogger, StorageError};
