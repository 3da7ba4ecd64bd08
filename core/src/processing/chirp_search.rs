use ndarray::Array2;
use num_complex::Complex32;
use std::f64::consts::{LN_10, PI};

use crate::interface::Detection;
use crate::math::fft::FftHelper;
use crate::math::peaks::{LocalMaxima, PeakParams};
use crate::math::window::hann;
use crate::prelude::{
    DetectorError, DetectorResult, ProcessingStage, SearchConfig, StageInput, StageMetadata,
    StageOutput,
};
use crate::processing::buffer_pool::BufferPool;
use crate::telemetry::log::LogManager;

/// Wraps a DFT bin index into a signed frequency in cycles/sample, in [-0.5, 0.5).
pub fn normalized_frequency(bin: usize, frame_len: usize) -> f64 {
    (bin as f64 / frame_len as f64 + 0.5).rem_euclid(1.0) - 0.5
}

/// Level in dB of a windowed-DFT magnitude, given its natural logarithm.
///
/// A unit-amplitude tone under the Hann window reads 0 dB.
pub fn level_db(log_magnitude: f32, frame_len: usize) -> f32 {
    let scale_db = 20.0 * (2.0 / frame_len as f64).log10();
    (log_magnitude as f64 * 20.0 / LN_10 + scale_db) as f32
}

/// Per-configuration state computed once in `initialize`.
struct SearchPlan {
    frame_len: usize,
    window: Vec<f32>,
    sweep: Vec<f64>,
    fft: FftHelper,
    /// Rows follow the sweep, columns the DFT bins. Holds log-magnitudes once filled.
    field: Array2<f32>,
    peaks: PeakParams,
}

impl SearchPlan {
    fn new(config: &SearchConfig) -> Self {
        let frame_len = config.frame_len;
        let sweep = config.sweep_values();
        // Convert the dB floor into the log-magnitude units of the field.
        let threshold = config
            .min_level_db
            .map(|db| ((db as f64 / 20.0) * LN_10 + (frame_len as f64 / 2.0).ln()) as f32);

        Self {
            frame_len,
            window: hann(frame_len),
            field: Array2::zeros((sweep.len(), frame_len)),
            sweep,
            fft: FftHelper::new(frame_len),
            peaks: PeakParams {
                min_distance: config.min_distance,
                exclude_border: config.exclude_border,
                threshold,
            },
        }
    }

    fn fill_field(
        &mut self,
        frame: &[Complex32],
        windowed: &mut [Complex32],
        work: &mut [Complex32],
    ) -> DetectorResult<()> {
        for ((dst, &sample), &weight) in windowed.iter_mut().zip(frame).zip(&self.window) {
            *dst = sample * weight;
        }

        for (row, &rate) in self.sweep.iter().enumerate() {
            for (idx, (dst, &sample)) in work.iter_mut().zip(windowed.iter()).enumerate() {
                let i = idx as f64;
                let (sin, cos) = (-PI * rate * i * i).sin_cos();
                *dst = sample * Complex32::new(cos as f32, sin as f32);
            }
            self.fft.forward_in_place(work)?;

            let mut field_row = self.field.row_mut(row);
            for (cell, bin) in field_row.iter_mut().zip(work.iter()) {
                *cell = bin.norm().ln();
            }
        }

        // Silent bins give -inf, which is fine; NaN or +inf means the frame was not finite.
        if self.field.iter().any(|v| v.is_nan() || *v == f32::INFINITY) {
            return Err(DetectorError::Numerical(
                "search field is not finite".into(),
            ));
        }
        Ok(())
    }

    fn extract(&self, frame_index: usize) -> Vec<Detection> {
        LocalMaxima::find(self.field.view(), &self.peaks)
            .into_iter()
            .map(|(sweep_index, bin)| Detection {
                level_db: level_db(self.field[[sweep_index, bin]], self.frame_len),
                normalized_frequency: normalized_frequency(bin, self.frame_len),
                chirp_rate: self.sweep[sweep_index],
                frame_index,
                frequency_bin: bin,
                sweep_index,
            })
            .collect()
    }
}

/// Sweeps candidate chirp rates over a frame and reports peaks of the de-chirped spectrum.
pub struct ChirpSearchStage {
    pool: BufferPool<Complex32>,
    plan: Option<SearchPlan>,
    logger: LogManager,
}

impl ChirpSearchStage {
    pub fn new() -> Self {
        Self {
            pool: BufferPool::with_capacity(2),
            plan: None,
            logger: LogManager::new("chirp-search"),
        }
    }

    /// Convenience constructor that also initializes the stage.
    pub fn with_config(config: &SearchConfig) -> DetectorResult<Self> {
        let mut stage = Self::new();
        stage.initialize(config)?;
        Ok(stage)
    }

    pub fn frame_len(&self) -> Option<usize> {
        self.plan.as_ref().map(|plan| plan.frame_len)
    }

    /// Runs the sweep over one frame and returns its detections, strongest first.
    pub fn search(
        &mut self,
        frame: &[Complex32],
        frame_index: usize,
    ) -> DetectorResult<Vec<Detection>> {
        let Self { pool, plan, logger } = self;
        let plan = plan
            .as_mut()
            .ok_or_else(|| DetectorError::InvalidParameter("stage not initialized".into()))?;

        if frame.len() != plan.frame_len {
            return Err(DetectorError::InvalidInput(format!(
                "expected a frame of {} samples, got {}",
                plan.frame_len,
                frame.len()
            )));
        }

        let mut windowed = pool.checkout(plan.frame_len)?;
        let mut work = match pool.checkout(plan.frame_len) {
            Ok(buffer) => buffer,
            Err(err) => {
                pool.release(windowed);
                return Err(err);
            }
        };
        let filled = plan.fill_field(frame, &mut windowed, &mut work);
        pool.release(windowed);
        pool.release(work);
        filled?;

        let detections = plan.extract(frame_index);
        logger.detail(&format!(
            "frame {} -> {} detections",
            frame_index,
            detections.len()
        ));
        Ok(detections)
    }
}

impl Default for ChirpSearchStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for ChirpSearchStage {
    fn initialize(&mut self, config: &SearchConfig) -> DetectorResult<()> {
        config.validate()?;
        self.plan = Some(SearchPlan::new(config));
        self.logger.detail(&format!(
            "planned {} chirp-rate candidates over {}-sample frames",
            config.sweep_len(),
            config.frame_len
        ));
        Ok(())
    }

    fn execute(&mut self, input: StageInput<'_>) -> DetectorResult<StageOutput> {
        let detections = self.search(input.samples, input.frame_index)?;
        let peak_level_db = detections.first().map(|d| d.level_db);
        let metadata = StageMetadata {
            peak_level_db,
            notes: vec![format!(
                "frame {} detections {}",
                input.frame_index,
                detections.len()
            )],
        };
        Ok(StageOutput {
            detections,
            metadata,
        })
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.plan = None;
    }
}
