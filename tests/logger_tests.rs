//! Durability tests for the buffered CSV logger
//!
//! Exercises the flush discipline independently from the acquisition loop:
//! header-once semantics across reopens, automatic flush cadence, and the
//! all-or-nothing buffer contract.

use chrono::{TimeZone, Utc};
use clampmon::storage::CsvLogger;
use clampmon::types::{MachineState, Measurement, MeasurementRecord, CSV_HEADER};

fn record(seq: i64) -> MeasurementRecord {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(seq);
    MeasurementRecord::new(
        ts,
        "pi-test",
        "machine-T",
        Measurement {
            rms_current: 0.5 + seq as f64 * 0.01,
            power_w: 345.0 + seq as f64,
        },
        230.0,
        MachineState::Running,
    )
}

fn read_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn logging_n_records_flushes_floor_n_over_f_times() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut logger = CsvLogger::open(&path, 10).unwrap();

    for i in 0..25 {
        logger.log(record(i)).unwrap();
    }
    // 2 automatic flushes of 10; 5 left buffered
    assert_eq!(logger.total_written(), 20);
    assert_eq!(logger.buffered(), 5);

    logger.flush().unwrap();
    assert_eq!(logger.total_written(), 25);
    assert_eq!(logger.buffered(), 0);

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 26); // header + 25 records
    assert_eq!(lines[0], CSV_HEADER);
}

#[test]
fn buffer_never_exceeds_flush_interval() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut logger = CsvLogger::open(&path, 4).unwrap();

    for i in 0..23 {
        logger.log(record(i)).unwrap();
        assert!(logger.buffered() < 4, "buffer must drain at the interval");
    }
}

#[test]
fn flush_on_empty_buffer_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut logger = CsvLogger::open(&path, 10).unwrap();

    logger.flush().unwrap();
    logger.flush().unwrap();
    assert_eq!(logger.total_written(), 0);
    assert_eq!(read_lines(&path).len(), 1); // header only
}

#[test]
fn reopen_never_duplicates_header_or_reorders_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.csv");

    {
        let mut logger = CsvLogger::open(&path, 10).unwrap();
        for i in 0..3 {
            logger.log(record(i)).unwrap();
        }
        logger.flush().unwrap();
    }
    let first_pass = read_lines(&path);

    {
        let mut logger = CsvLogger::open(&path, 10).unwrap();
        for i in 3..5 {
            logger.log(record(i)).unwrap();
        }
        logger.flush().unwrap();
    }

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 6); // header + 5 records
    let header_count = lines.iter().filter(|l| l.as_str() == CSV_HEADER).count();
    assert_eq!(header_count, 1, "header must be written exactly once");
    // Rows from the first session are untouched and still in order
    assert_eq!(&lines[..4], &first_pass[..]);
}

#[test]
fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deep").join("readings.csv");

    let mut logger = CsvLogger::open(&path, 1).unwrap();
    logger.log(record(0)).unwrap();
    assert_eq!(logger.total_written(), 1);
    assert!(path.exists());
}

#[test]
fn records_flush_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    let mut logger = CsvLogger::open(&path, 100).unwrap();

    for i in 0..5 {
        logger.log(record(i)).unwrap();
    }
    logger.flush().unwrap();

    let lines = read_lines(&path);
    let timestamps: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_unstable();
    assert_eq!(timestamps, sorted);
}
