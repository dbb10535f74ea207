//! Buffered append-only CSV logger
//!
//! Durability discipline:
//! - the header line is written exactly once, when the file is new or
//!   empty; reopening an existing store never rewrites or reorders it
//! - records accumulate in an in-memory buffer and are flushed as a single
//!   append once the buffer reaches the flush interval
//! - a flush either persists the entire buffer or leaves it untouched and
//!   reports the failure, so a restart can re-attempt without silent loss
//!
//! The file is opened in append mode by exactly one writer and held open
//! for the life of the logger.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::types::{MeasurementRecord, CSV_HEADER};

/// Storage failures. Fatal at the point they occur; a failed flush leaves
/// the buffer intact.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to append to log file {path}: {source}")]
    Append {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Buffered CSV logger over a single append-only file.
pub struct CsvLogger {
    path: PathBuf,
    file: File,
    buffer: Vec<MeasurementRecord>,
    flush_interval: usize,
    total_written: u64,
}

impl CsvLogger {
    /// Open (or create) the store at `path`, creating parent directories
    /// as needed. Writes the column header only when the file is new or
    /// empty.
    pub fn open(path: &Path, flush_interval: usize) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StorageError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        let is_new = file
            .metadata()
            .map(|m| m.len() == 0)
            .map_err(|e| StorageError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;
        if is_new {
            file.write_all(format!("{CSV_HEADER}\n").as_bytes())
                .and_then(|()| file.sync_data())
                .map_err(|e| StorageError::Append {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            buffer: Vec::with_capacity(flush_interval.max(1)),
            flush_interval: flush_interval.max(1),
            total_written: 0,
        })
    }

    /// Append a record to the buffer, flushing synchronously once the
    /// buffer reaches the flush interval.
    pub fn log(&mut self, record: MeasurementRecord) -> Result<(), StorageError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.flush_interval {
            self.flush()?;
        }
        Ok(())
    }

    /// Persist all buffered records as one append, in insertion order.
    ///
    /// No-op on an empty buffer. On failure the buffer is left unmodified.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let mut chunk = String::with_capacity(self.buffer.len() * 96);
        for record in &self.buffer {
            chunk.push_str(&record.to_csv_row());
            chunk.push('\n');
        }

        self.file
            .write_all(chunk.as_bytes())
            .and_then(|()| self.file.sync_data())
            .map_err(|e| StorageError::Append {
                path: self.path.clone(),
                source: e,
            })?;

        self.total_written += self.buffer.len() as u64;
        debug!(
            flushed = self.buffer.len(),
            total = self.total_written,
            "flushed records to store"
        );
        self.buffer.clear();
        Ok(())
    }

    /// Records currently buffered, awaiting persistence.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Monotonic count of records durably written since open.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MachineState, Measurement, MeasurementRecord};
    use chrono::{TimeZone, Utc};

    fn record(seq: i64) -> MeasurementRecord {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::seconds(seq);
        MeasurementRecord::new(
            ts,
            "pi-test",
            "machine-T",
            Measurement {
                rms_current: 0.7,
                power_w: 483.0,
            },
            230.0,
            MachineState::Running,
        )
    }

    #[test]
    fn failed_flush_leaves_buffer_intact_and_counter_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.csv");
        let mut logger = CsvLogger::open(&path, 10).unwrap();
        for i in 0..3 {
            logger.log(record(i)).unwrap();
        }

        // Swap the held handle for a read-only one so the append fails
        logger.file = File::open(&path).unwrap();
        let err = logger.flush().unwrap_err();
        assert!(matches!(err, StorageError::Append { .. }));
        assert_eq!(logger.buffered(), 3, "buffer must survive a failed flush");
        assert_eq!(logger.total_written(), 0);

        // A restored writer re-attempts the same buffer successfully
        logger.file = OpenOptions::new().append(true).open(&path).unwrap();
        logger.flush().unwrap();
        assert_eq!(logger.buffered(), 0);
        assert_eq!(logger.total_written(), 3);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 4); // header + 3 records
    }
}
