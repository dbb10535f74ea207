//! Acquisition Pipeline Module
//!
//! ## Cycle Architecture
//!
//! ```text
//! WindowSampling:  draw window_size samples at sample_rate_hz, average
//! RecordBuilding:  transform -> classify -> stamp UTC -> assemble record
//! Logged:          hand record to the logger, count, check stop condition
//! Stopped:         terminal — flushed, stats reported
//! ```
//!
//! Single-threaded and fully synchronous; the only waits are the
//! inter-sample and inter-window sleeps.

mod acquisition_loop;

pub use acquisition_loop::{AcquisitionLoop, LoopState, PipelineError, PipelineStats, StopReason};
