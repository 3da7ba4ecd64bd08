use crate::interface::{Detection, DetectionRecord};
use crate::prelude::{DetectorResult, StreamConfig};

/// Maps frame-local detections into stream time and physical units.
///
/// Chirp rates leave the search in cycles/sample²; multiplying by the squared
/// sample rate gives Hz/s. The frequency change across one frame is
/// `rate · N · sample_rate` Hz, carried separately as the segment span.
#[derive(Debug, Clone)]
pub struct Aggregator {
    sample_rate: f64,
    frame_len: usize,
    frequency_offset: f64,
}

impl Aggregator {
    pub fn new(stream: &StreamConfig, frame_len: usize) -> DetectorResult<Self> {
        stream.validate()?;
        Ok(Self {
            sample_rate: stream.sample_rate,
            frame_len,
            frequency_offset: stream.frequency_offset,
        })
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_len as f64 / self.sample_rate
    }

    pub fn to_record(&self, detection: &Detection, snapshot_offset: f64) -> DetectionRecord {
        let n = self.frame_len as f64;
        DetectionRecord {
            level_db: detection.level_db,
            time_offset: snapshot_offset + detection.frame_index as f64 * n / self.sample_rate,
            frequency: detection.normalized_frequency * self.sample_rate + self.frequency_offset,
            chirp_rate: detection.chirp_rate * self.sample_rate * self.sample_rate,
            duration: self.frame_duration(),
            frequency_span: detection.chirp_rate * n * self.sample_rate,
            frame_index: detection.frame_index,
            frequency_bin: detection.frequency_bin,
        }
    }

    /// Merges per-frame results into one list ordered by frame, then by discovery
    /// order within each frame. Detections are not deduplicated across frames.
    pub fn merge(
        &self,
        mut per_frame: Vec<(usize, Vec<Detection>)>,
        snapshot_offset: f64,
    ) -> Vec<DetectionRecord> {
        per_frame.sort_by_key(|(frame_index, _)| *frame_index);
        per_frame
            .iter()
            .flat_map(|(_, detections)| detections.iter())
            .map(|detection| self.to_record(detection, snapshot_offset))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(sample_rate: f64, frequency_offset: f64) -> StreamConfig {
        StreamConfig {
            sample_rate,
            snapshot_period: 2.0,
            frequency_offset,
        }
    }

    fn detection(frame_index: usize, normalized_frequency: f64, chirp_rate: f64) -> Detection {
        Detection {
            level_db: -1.0,
            normalized_frequency,
            chirp_rate,
            frame_index,
            frequency_bin: 0,
            sweep_index: 0,
        }
    }

    #[test]
    fn maps_detection_into_physical_units() {
        let aggregator = Aggregator::new(&stream(10_000.0, 250.0), 1000).unwrap();
        let record = aggregator.to_record(&detection(3, 0.1, 5e-7), 480.0);

        assert!((record.time_offset - 480.3).abs() < 1e-9);
        assert!((record.frequency - 1_250.0).abs() < 1e-9);
        assert!((record.chirp_rate - 50.0).abs() < 1e-9);
        assert!((record.duration - 0.1).abs() < 1e-12);
        assert!((record.frequency_span - 5.0).abs() < 1e-9);
        assert_eq!(record.frame_index, 3);
    }

    #[test]
    fn negative_frequencies_stay_below_half_rate() {
        let aggregator = Aggregator::new(&stream(8_000.0, 0.0), 256).unwrap();
        let record = aggregator.to_record(&detection(0, -0.5, 0.0), 0.0);
        assert_eq!(record.frequency, -4_000.0);
    }

    #[test]
    fn merge_orders_by_frame_and_keeps_discovery_order() {
        let aggregator = Aggregator::new(&stream(1_000.0, 0.0), 100).unwrap();
        let per_frame = vec![
            (2, vec![detection(2, 0.3, 0.0)]),
            (0, vec![detection(0, 0.1, 0.0), detection(0, -0.2, 0.0)]),
            (1, Vec::new()),
        ];
        let merged = aggregator.merge(per_frame, 0.0);
        let frequencies: Vec<f64> = merged.iter().map(|r| r.frequency).collect();
        assert_eq!(frequencies.len(), 3);
        assert!((frequencies[0] - 100.0).abs() < 1e-9);
        assert!((frequencies[1] + 200.0).abs() < 1e-9);
        assert!((frequencies[2] - 300.0).abs() < 1e-9);
        assert!((merged[2].time_offset - 0.2).abs() < 1e-12);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let aggregator = Aggregator::new(&stream(1_000.0, 0.0), 100).unwrap();
        assert!(aggregator.merge(Vec::new(), 12.0).is_empty());
    }

    #[test]
    fn rejects_invalid_stream_config() {
        assert!(Aggregator::new(&stream(-1.0, 0.0), 100).is_err());
    }
}
