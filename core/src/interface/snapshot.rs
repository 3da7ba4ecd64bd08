use num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::interface::DetectionRecord;
use crate::math::stats::StatsHelper;
use crate::prelude::{DetectorError, DetectorResult};

/// Percentiles of the detection levels that bound the overlay intensity scale.
const OVERLAY_LOW_PERCENTILE: f32 = 20.0;
const OVERLAY_HIGH_PERCENTILE: f32 = 95.0;

/// Everything the external renderer receives for one snapshot, apart from the raw samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub index: usize,
    /// Seconds since stream start.
    pub time_offset: f64,
    pub sample_rate: f64,
    pub frequency_offset: f64,
    pub sample_count: usize,
    pub frame_count: usize,
    pub detections: Vec<DetectionRecord>,
}

impl SnapshotReport {
    /// Duration covered by the snapshot's samples, in seconds.
    pub fn duration(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate
    }

    /// Level bounds (dB) used to scale overlay opacity, `None` without detections.
    pub fn level_range(&self) -> Option<(f32, f32)> {
        let levels: Vec<f32> = self.detections.iter().map(|d| d.level_db).collect();
        let low = StatsHelper::percentile(&levels, OVERLAY_LOW_PERCENTILE)?;
        let high = StatsHelper::percentile(&levels, OVERLAY_HIGH_PERCENTILE)?;
        Some((low, high))
    }

    /// Overlay opacity in [0, 1] for every detection, in report order.
    pub fn overlay_alphas(&self) -> Vec<f32> {
        let Some((low, high)) = self.level_range() else {
            return Vec::new();
        };
        let spread = high - low;
        self.detections
            .iter()
            .map(|d| {
                if spread > 0.0 {
                    ((d.level_db - low) / spread).clamp(0.0, 1.0)
                } else {
                    1.0
                }
            })
            .collect()
    }

    pub fn to_json(&self) -> DetectorResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| DetectorError::Sink(format!("encoding snapshot report: {}", err)))
    }
}

/// Consumer of per-snapshot results, typically a waterfall renderer.
pub trait SnapshotSink {
    fn publish(&mut self, report: &SnapshotReport, samples: &[Complex32]) -> DetectorResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level_db: f32) -> DetectionRecord {
        DetectionRecord {
            level_db,
            time_offset: 0.0,
            frequency: 0.0,
            chirp_rate: 0.0,
            duration: 1.0,
            frequency_span: 0.0,
            frame_index: 0,
            frequency_bin: 0,
        }
    }

    #[test]
    fn empty_report_has_no_level_range() {
        let report = SnapshotReport::default();
        assert!(report.level_range().is_none());
        assert!(report.overlay_alphas().is_empty());
    }

    #[test]
    fn overlay_alphas_are_clamped_to_unit_range() {
        let report = SnapshotReport {
            sample_rate: 1.0,
            detections: (0..=10).map(|i| record(i as f32 * 10.0)).collect(),
            ..Default::default()
        };
        let (low, high) = report.level_range().unwrap();
        assert!((low - 20.0).abs() < 1e-4);
        assert!((high - 95.0).abs() < 1e-4);

        let alphas = report.overlay_alphas();
        assert_eq!(alphas.len(), 11);
        assert_eq!(alphas[0], 0.0);
        assert_eq!(alphas[10], 1.0);
        assert!(alphas.iter().all(|a| (0.0..=1.0).contains(a)));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = SnapshotReport {
            index: 2,
            time_offset: 480.0,
            sample_rate: 10_000.0,
            sample_count: 20_000,
            frame_count: 1,
            detections: vec![record(-3.0)],
            ..Default::default()
        };
        let json = report.to_json().unwrap();
        let decoded: SnapshotReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.index, 2);
        assert_eq!(decoded.detections.len(), 1);
        assert_eq!(report.duration(), 2.0);
    }
}
