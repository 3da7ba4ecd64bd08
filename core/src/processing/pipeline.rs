use num_complex::Complex32;

use crate::interface::SnapshotReport;
use crate::math::stats::StatsHelper;
use crate::prelude::{DetectorResult, ProcessingStage, SearchConfig, StageInput, StreamConfig};
use crate::processing::aggregator::Aggregator;
use crate::processing::chirp_search::ChirpSearchStage;
use crate::processing::segmenter::segment;
use crate::telemetry::log::LogManager;

/// Runs one snapshot through segmenter, chirp search and aggregator.
///
/// The search stage is planned once and reused for every frame and snapshot.
pub struct SnapshotProcessor {
    stage: ChirpSearchStage,
    aggregator: Aggregator,
    stream: StreamConfig,
    frame_len: usize,
    logger: LogManager,
}

impl SnapshotProcessor {
    pub fn new(search: &SearchConfig, stream: &StreamConfig) -> DetectorResult<Self> {
        let stage = ChirpSearchStage::with_config(search)?;
        let aggregator = Aggregator::new(stream, search.frame_len)?;
        Ok(Self {
            stage,
            aggregator,
            stream: stream.clone(),
            frame_len: search.frame_len,
            logger: LogManager::new("pipeline"),
        })
    }

    pub fn stream(&self) -> &StreamConfig {
        &self.stream
    }

    /// Either every frame of the snapshot succeeds or the whole snapshot fails.
    pub fn process(
        &mut self,
        samples: &[Complex32],
        index: usize,
        time_offset: f64,
    ) -> DetectorResult<SnapshotReport> {
        let frames = segment(samples, self.frame_len)?;
        let frame_count = frames.len();
        if !frames.remainder().is_empty() {
            self.logger.detail(&format!(
                "snapshot {} drops {} trailing samples",
                index,
                frames.remainder().len()
            ));
        }

        let mut per_frame = Vec::with_capacity(frame_count);
        for (frame_index, frame) in frames {
            let output = self.stage.execute(StageInput {
                samples: frame,
                frame_index,
            })?;
            self.logger.detail(&format!(
                "snapshot {} frame {}/{}: {}",
                index,
                frame_index + 1,
                frame_count,
                output.metadata.notes.join(", ")
            ));
            per_frame.push((frame_index, output.detections));
        }

        let detections = self.aggregator.merge(per_frame, time_offset);
        self.logger.record(&format!(
            "snapshot {} at {:.1}s: {} frames, {} detections, RMS {:.4}",
            index,
            time_offset,
            frame_count,
            detections.len(),
            StatsHelper::rms(samples)
        ));

        Ok(SnapshotReport {
            index,
            time_offset,
            sample_rate: self.stream.sample_rate,
            frequency_offset: self.stream.frequency_offset,
            sample_count: samples.len(),
            frame_count,
            detections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::chirp_search::tests::chirp;
    use std::f64::consts::TAU;

    #[test]
    fn single_chirp_snapshot_end_to_end() {
        let sample_rate = 10_000.0;
        let search = SearchConfig {
            min_level_db: Some(-15.0),
            ..Default::default()
        };
        let stream = StreamConfig {
            sample_rate,
            snapshot_period: 2.0,
            frequency_offset: 0.0,
        };
        let n = search.frame_len;

        // 1000 Hz start, 50 Hz/s slope, filling the first frame of a 2 s snapshot.
        let f0 = 1_000.0 / sample_rate;
        let rate = 50.0 / (sample_rate * sample_rate);
        let mut samples = vec![Complex32::new(0.0, 0.0); stream.snapshot_samples()];
        samples[..n].copy_from_slice(&chirp(n, f0, rate, 1.0));

        let mut processor = SnapshotProcessor::new(&search, &stream).unwrap();
        let report = processor.process(&samples, 0, 0.0).unwrap();

        assert_eq!(report.frame_count, 1);
        assert_eq!(report.sample_count, 20_000);
        assert_eq!(report.detections.len(), 1);

        let found = report.detections[0];
        let rate_step_hz = search.sweep_step / (n as f64 * TAU) * sample_rate * sample_rate;
        assert!((found.frequency - 1_000.0).abs() <= sample_rate / n as f64);
        assert!((found.chirp_rate - 50.0).abs() <= rate_step_hz);
        assert_eq!(found.time_offset, 0.0);
        assert!((found.duration - n as f64 / sample_rate).abs() < 1e-12);
    }

    #[test]
    fn empty_snapshot_yields_empty_report() {
        let search = SearchConfig {
            frame_len: 256,
            ..Default::default()
        };
        let stream = StreamConfig {
            sample_rate: 1_000.0,
            ..Default::default()
        };
        let mut processor = SnapshotProcessor::new(&search, &stream).unwrap();
        let report = processor.process(&[], 4, 960.0).unwrap();
        assert_eq!(report.index, 4);
        assert_eq!(report.frame_count, 0);
        assert!(report.detections.is_empty());
    }

    #[test]
    fn detections_carry_frame_time_offsets() {
        let search = SearchConfig {
            frame_len: 1024,
            min_level_db: Some(-15.0),
            ..Default::default()
        };
        let stream = StreamConfig {
            sample_rate: 2_048.0,
            snapshot_period: 1.5,
            frequency_offset: 100.0,
        };
        let rate = search.sweep_values()[230];
        let mut samples = vec![Complex32::new(0.0, 0.0); 3 * 1024 + 10];
        samples[1024..2048].copy_from_slice(&chirp(1024, 0.125, rate, 1.0));

        let mut processor = SnapshotProcessor::new(&search, &stream).unwrap();
        let report = processor.process(&samples, 1, 1.5).unwrap();

        assert_eq!(report.frame_count, 3);
        assert_eq!(report.detections.len(), 1);
        let found = report.detections[0];
        assert_eq!(found.frame_index, 1);
        assert!((found.time_offset - 2.0).abs() < 1e-12);
        assert!((found.frequency - (0.125 * 2_048.0 + 100.0)).abs() <= 2.0);
    }

    #[test]
    fn non_finite_frame_fails_the_snapshot() {
        let search = SearchConfig {
            frame_len: 256,
            ..Default::default()
        };
        let stream = StreamConfig {
            sample_rate: 1_000.0,
            ..Default::default()
        };
        let mut samples = vec![Complex32::new(0.1, 0.0); 512];
        samples[300] = Complex32::new(f32::INFINITY, 0.0);

        let mut processor = SnapshotProcessor::new(&search, &stream).unwrap();
        assert!(processor.process(&samples, 0, 0.0).is_err());
    }
}
