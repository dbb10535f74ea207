//! Voltage trace replay source
//!
//! Plays back a newline-delimited file of raw ADC voltages captured from a
//! real deployment. The trace plays exactly once; exhausting it yields
//! [`SampleEvent::Eof`], which the acquisition loop treats as a clean stop
//! with a final flush. Pacing still comes from the loop's sample-rate
//! sleeps.

use std::path::Path;

use super::{AcquisitionError, SampleEvent, SensorSource};

/// Replays a captured voltage trace from a file, once through.
pub struct ReplaySource {
    trace: Vec<f64>,
    position: usize,
    reference_voltage: f64,
    name: String,
}

impl ReplaySource {
    /// Load a trace file: one voltage per line, blank lines and `#`
    /// comments skipped. Fails if the file is unreadable, contains an
    /// unparseable line, or holds no samples at all.
    pub fn from_file(path: &Path, reference_voltage: f64) -> Result<Self, AcquisitionError> {
        let contents = std::fs::read_to_string(path)?;
        let mut trace = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let v: f64 = line.parse().map_err(|_| {
                AcquisitionError::ReadFailed(format!(
                    "unparseable voltage at {}:{}: '{line}'",
                    path.display(),
                    lineno + 1
                ))
            })?;
            trace.push(v);
        }
        if trace.is_empty() {
            return Err(AcquisitionError::ReadFailed(format!(
                "trace file {} contains no samples",
                path.display()
            )));
        }
        Ok(Self {
            trace,
            position: 0,
            reference_voltage,
            name: format!("replay:{}", path.display()),
        })
    }
}

impl SensorSource for ReplaySource {
    fn sample(&mut self) -> Result<SampleEvent, AcquisitionError> {
        let Some(&v) = self.trace.get(self.position) else {
            return Ok(SampleEvent::Eof);
        };
        self.position += 1;
        // A captured out-of-range value replays as the hardware fault it was.
        if !v.is_finite() || v < 0.0 || v > self.reference_voltage {
            return Err(AcquisitionError::OutOfRange {
                value: v,
                reference: self.reference_voltage,
            });
        }
        Ok(SampleEvent::Sample(v))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn trace_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn replays_once_then_reports_eof() {
        let f = trace_file("0.5\n1.0\n# comment\n\n1.5\n");
        let mut src = ReplaySource::from_file(f.path(), 3.3).unwrap();
        assert_eq!(src.sample().unwrap(), SampleEvent::Sample(0.5));
        assert_eq!(src.sample().unwrap(), SampleEvent::Sample(1.0));
        assert_eq!(src.sample().unwrap(), SampleEvent::Sample(1.5));
        assert_eq!(src.sample().unwrap(), SampleEvent::Eof);
        assert_eq!(src.sample().unwrap(), SampleEvent::Eof);
    }

    #[test]
    fn out_of_range_sample_is_a_hardware_fault() {
        let f = trace_file("5.0\n");
        let mut src = ReplaySource::from_file(f.path(), 3.3).unwrap();
        assert!(matches!(
            src.sample(),
            Err(AcquisitionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn empty_trace_is_rejected() {
        let f = trace_file("# nothing here\n");
        assert!(ReplaySource::from_file(f.path(), 3.3).is_err());
    }
}
