use num_complex::Complex32;

pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[Complex32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|v| v.norm_sqr()).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Linearly interpolated percentile (`pct` in [0, 100]), `None` for an empty slice.
    pub fn percentile(values: &[f32], pct: f32) -> Option<f32> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
        let lower = rank.floor() as usize;
        let upper = rank.ceil() as usize;
        let frac = rank - lower as f32;
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
    }
}
