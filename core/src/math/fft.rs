use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner, Length};

use crate::prelude::{DetectorError, DetectorResult};

/// Helper that wraps the `rustfft` planner for reuse.
pub struct FftHelper {
    fft: std::sync::Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex32::zero(); fft.get_inplace_scratch_len()];
        Self { fft, scratch }
    }

    pub fn len(&self) -> usize {
        self.fft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fft.len() == 0
    }

    /// Forward transform in place; the buffer must match the planned length.
    pub fn forward_in_place(&mut self, buffer: &mut [Complex32]) -> DetectorResult<()> {
        if buffer.len() != self.fft.len() {
            return Err(DetectorError::Numerical(format!(
                "transform of length {} applied to {} samples",
                self.fft.len(),
                buffer.len()
            )));
        }
        self.fft.process_with_scratch(buffer, &mut self.scratch);
        Ok(())
    }
}
