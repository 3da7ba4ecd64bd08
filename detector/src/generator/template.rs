use num_complex::Complex32;
use std::f64::consts::TAU;

/// Linear chirp `amplitude·exp(2πj·(f0·x + rate·x²/2))`, with `f0` in
/// cycles/sample and `rate` in cycles/sample².
pub fn chirp_segment(length: usize, f0: f64, rate: f64, amplitude: f32) -> Vec<Complex32> {
    (0..length)
        .map(|x| {
            let x = x as f64;
            let phase = TAU * (f0 * x + 0.5 * rate * x * x);
            Complex32::new(phase.cos() as f32, phase.sin() as f32) * amplitude
        })
        .collect()
}
