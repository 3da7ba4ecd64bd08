use serde::{Deserialize, Serialize};

/// Frame-local detection emitted by the chirp-search stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Peak level in dB, 0 dB being a unit-amplitude tone under the Hann window.
    pub level_db: f32,
    /// Starting frequency in cycles/sample, wrapped into [-0.5, 0.5).
    pub normalized_frequency: f64,
    /// Frequency slope in cycles/sample².
    pub chirp_rate: f64,
    pub frame_index: usize,
    /// Raw DFT bin of the peak, before wrapping.
    pub frequency_bin: usize,
    /// Row of the peak along the sweep axis.
    pub sweep_index: usize,
}

/// Detection mapped into stream-global time and physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub level_db: f32,
    /// Start of the frame the detection was found in, seconds since stream start.
    pub time_offset: f64,
    /// Starting frequency in Hz, including the configured offset.
    pub frequency: f64,
    /// Frequency slope in Hz/s.
    pub chirp_rate: f64,
    /// Frame duration in seconds.
    pub duration: f64,
    /// Frequency change over the frame in Hz.
    pub frequency_span: f64,
    pub frame_index: usize,
    pub frequency_bin: usize,
}

impl DetectionRecord {
    /// Time and frequency at the far end of the detected segment.
    pub fn end_point(&self) -> (f64, f64) {
        (
            self.time_offset + self.duration,
            self.frequency + self.frequency_span,
        )
    }
}
