//! Durable record storage
//!
//! Append-only CSV persistence with buffered, all-or-nothing flushes.

mod csv_logger;

pub use csv_logger::{CsvLogger, StorageError};
