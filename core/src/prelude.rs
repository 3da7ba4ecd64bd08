use num_complex::Complex32;
use serde::{Deserialize, Serialize};

use crate::interface::Detection;

/// Search-space configuration shared by the segmenter and the chirp-search stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Frame length N, also the DFT length.
    pub frame_len: usize,
    /// First sweep value before scaling by 1/(N·2π).
    pub sweep_start: f64,
    /// Exclusive end of the sweep before scaling.
    pub sweep_stop: f64,
    pub sweep_step: f64,
    /// Minimum separation between accepted peaks, in field cells.
    pub min_distance: usize,
    pub exclude_border: bool,
    /// Peaks below this level (dB) are not reported. `None` keeps every
    /// local maximum above the field minimum.
    pub min_level_db: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            frame_len: 16384,
            sweep_start: -0.40,
            sweep_stop: 0.40,
            sweep_step: 0.002,
            min_distance: 100,
            exclude_border: true,
            min_level_db: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> DetectorResult<()> {
        if self.frame_len == 0 {
            return Err(DetectorError::InvalidConfiguration(
                "frame length must be positive".into(),
            ));
        }
        if !self.sweep_start.is_finite() || !self.sweep_stop.is_finite() {
            return Err(DetectorError::InvalidConfiguration(
                "sweep bounds must be finite".into(),
            ));
        }
        if self.sweep_start >= self.sweep_stop {
            return Err(DetectorError::InvalidConfiguration(format!(
                "sweep start {} must be below sweep stop {}",
                self.sweep_start, self.sweep_stop
            )));
        }
        if !(self.sweep_step.is_finite() && self.sweep_step > 0.0) {
            return Err(DetectorError::InvalidConfiguration(format!(
                "sweep step {} must be positive",
                self.sweep_step
            )));
        }
        if let Some(level) = self.min_level_db {
            if !level.is_finite() {
                return Err(DetectorError::InvalidConfiguration(
                    "minimum level must be finite".into(),
                ));
            }
        }
        Ok(())
    }

    /// Number of candidate chirp rates in the sweep.
    pub fn sweep_len(&self) -> usize {
        ((self.sweep_stop - self.sweep_start) / self.sweep_step).ceil() as usize
    }

    /// Candidate chirp rates in cycles/sample², ascending.
    pub fn sweep_values(&self) -> Vec<f64> {
        let scale = 1.0 / (self.frame_len as f64 * std::f64::consts::TAU);
        (0..self.sweep_len())
            .map(|idx| (self.sweep_start + idx as f64 * self.sweep_step) * scale)
            .collect()
    }
}

/// Stream-level configuration used to map frame-local results into physical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Samples per second.
    pub sample_rate: f64,
    /// Seconds of input per snapshot.
    pub snapshot_period: f64,
    /// Added to every reported frequency (Hz), e.g. the tuner centre.
    pub frequency_offset: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1.0,
            snapshot_period: 240.0,
            frequency_offset: 0.0,
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> DetectorResult<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(DetectorError::InvalidConfiguration(format!(
                "sample rate {} must be positive",
                self.sample_rate
            )));
        }
        if !(self.snapshot_period.is_finite() && self.snapshot_period > 0.0) {
            return Err(DetectorError::InvalidConfiguration(format!(
                "snapshot period {} must be positive",
                self.snapshot_period
            )));
        }
        if !self.frequency_offset.is_finite() {
            return Err(DetectorError::InvalidConfiguration(
                "frequency offset must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Complex samples read per snapshot.
    pub fn snapshot_samples(&self) -> usize {
        (self.sample_rate * self.snapshot_period) as usize
    }
}

/// Input payload for a processing stage: one frame of samples.
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    pub samples: &'a [Complex32],
    pub frame_index: usize,
}

/// Output produced by a processing stage.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub detections: Vec<Detection>,
    pub metadata: StageMetadata,
}

/// Metadata used for chaining stages and telemetry.
#[derive(Debug, Clone, Default)]
pub struct StageMetadata {
    pub peak_level_db: Option<f32>,
    pub notes: Vec<String>,
}

/// Common error type for the detector core.
#[derive(thiserror::Error, Debug)]
pub enum DetectorError {
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("numerical failure: {0}")]
    Numerical(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink failure: {0}")]
    Sink(String),
}

pub type DetectorResult<T> = Result<T, DetectorError>;

/// Trait describing frame-level signal-processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &SearchConfig) -> DetectorResult<()>;
    fn execute(&mut self, input: StageInput<'_>) -> DetectorResult<StageOutput>;
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sweep_has_four_hundred_candidates() {
        let config = SearchConfig::default();
        assert_eq!(config.sweep_len(), 400);
        let values = config.sweep_values();
        let scale = 1.0 / (16384.0 * std::f64::consts::TAU);
        assert!((values[0] + 0.40 * scale).abs() < 1e-15);
        assert!((values[399] - 0.398 * scale).abs() < 1e-15);
    }

    #[test]
    fn search_config_rejects_malformed_sweep() {
        let mut config = SearchConfig {
            sweep_start: 0.4,
            sweep_stop: -0.4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DetectorError::InvalidConfiguration(_))
        ));

        config.sweep_start = -0.4;
        config.sweep_stop = 0.4;
        config.sweep_step = 0.0;
        assert!(config.validate().is_err());

        config.sweep_step = 0.002;
        config.frame_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn stream_config_rejects_non_positive_values() {
        let config = StreamConfig {
            sample_rate: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StreamConfig {
            sample_rate: 10_000.0,
            snapshot_period: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn snapshot_samples_follow_rate_and_period() {
        let config = StreamConfig {
            sample_rate: 10_000.0,
            snapshot_period: 2.0,
            frequency_offset: 0.0,
        };
        assert_eq!(config.snapshot_samples(), 20_000);
    }
}
