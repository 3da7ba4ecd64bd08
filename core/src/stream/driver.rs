use std::io::Read;
use std::sync::Arc;

use crate::interface::SnapshotSink;
use crate::prelude::{DetectorError, DetectorResult, SearchConfig, StreamConfig};
use crate::processing::pipeline::SnapshotProcessor;
use crate::stream::reader::SnapshotReader;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{Metrics, MetricsRecorder};

/// Pulls snapshots from a byte source until it is exhausted and hands each
/// snapshot's detections to a sink.
///
/// A snapshot whose processing fails is skipped with a warning; the stream
/// time still advances past it. Read and sink failures end the run.
pub struct StreamingDriver {
    processor: SnapshotProcessor,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
    time_offset: f64,
    next_index: usize,
}

impl StreamingDriver {
    pub fn new(search: &SearchConfig, stream: &StreamConfig) -> DetectorResult<Self> {
        Ok(Self {
            processor: SnapshotProcessor::new(search, stream)?,
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("driver"),
            time_offset: 0.0,
            next_index: 0,
        })
    }

    /// Seconds since stream start of the next snapshot.
    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    pub fn metrics(&self) -> Arc<MetricsRecorder> {
        self.metrics.clone()
    }

    pub fn run<R, S>(&mut self, source: R, sink: &mut S) -> DetectorResult<Metrics>
    where
        R: Read,
        S: SnapshotSink + ?Sized,
    {
        let stream = self.processor.stream().clone();
        let mut reader = SnapshotReader::new(source, stream.snapshot_samples())?;

        while let Some(raw) = reader.next_snapshot()? {
            let index = self.next_index;
            let time_offset = self.time_offset;

            if raw.dropped_bytes > 0 {
                self.metrics.record_malformed();
                let err = DetectorError::MalformedInput(format!(
                    "snapshot {} ends with {} bytes of an incomplete sample",
                    index, raw.dropped_bytes
                ));
                self.logger.warn(&err.to_string());
            }

            match self.processor.process(&raw.samples, index, time_offset) {
                Ok(report) => {
                    self.metrics
                        .record_snapshot(report.frame_count, report.detections.len());
                    sink.publish(&report, &raw.samples)?;
                }
                Err(err) => {
                    self.metrics.record_skipped();
                    self.logger.warn(&format!(
                        "skipping snapshot {} at {:.1}s: {}",
                        index, time_offset, err
                    ));
                }
            }

            self.next_index += 1;
            self.time_offset += stream.snapshot_period;
        }

        let metrics = self.metrics.snapshot();
        self.logger.record(&format!(
            "end of stream after {} snapshots ({} skipped), {} detections",
            metrics.snapshots + metrics.skipped,
            metrics.skipped,
            metrics.detections
        ));
        Ok(metrics)
    }
}
