use chirpcore::interface::{SnapshotReport, SnapshotSink};
use chirpcore::prelude::{DetectorError, DetectorResult};
use chirpcore::stream::reader::encode_samples;
use log::info;
use num_complex::Complex32;
use std::fs;
use std::path::PathBuf;

/// Writes `<prefix>_<seconds:06>.json` per snapshot, plus the raw samples as
/// `<prefix>_<seconds:06>.iq` when enabled.
pub struct ReportWriter {
    prefix: String,
    write_samples: bool,
}

impl ReportWriter {
    pub fn new(prefix: impl Into<String>, write_samples: bool) -> Self {
        Self {
            prefix: prefix.into(),
            write_samples,
        }
    }

    pub fn path_for(&self, report: &SnapshotReport, extension: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}_{:06}.{}",
            self.prefix,
            report.time_offset.max(0.0) as u64,
            extension
        ))
    }

    fn write(&self, path: PathBuf, contents: &[u8]) -> DetectorResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        info!("writing {}", path.display());
        fs::write(&path, contents)?;
        Ok(())
    }
}

impl SnapshotSink for ReportWriter {
    fn publish(&mut self, report: &SnapshotReport, samples: &[Complex32]) -> DetectorResult<()> {
        let json = report.to_json()?;
        self.write(self.path_for(report, "json"), json.as_bytes())?;
        if self.write_samples {
            self.write(self.path_for(report, "iq"), &encode_samples(samples))?;
        }
        Ok(())
    }
}

/// Publishes every snapshot to each sink in turn, stopping at the first failure.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn SnapshotSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn SnapshotSink>) {
        self.sinks.push(sink);
    }
}

impl SnapshotSink for FanOut {
    fn publish(&mut self, report: &SnapshotReport, samples: &[Complex32]) -> DetectorResult<()> {
        if self.sinks.is_empty() {
            return Err(DetectorError::Sink("no output configured".into()));
        }
        for sink in self.sinks.iter_mut() {
            sink.publish(report, samples)?;
        }
        Ok(())
    }
}
