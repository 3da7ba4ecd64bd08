/// Periodic Hann window: `w[i] = 0.5·(1 − cos(2π·i/N))`.
pub fn hann(len: usize) -> Vec<f32> {
    let n = len as f64;
    (0..len)
        .map(|i| (0.5 * (1.0 - (std::f64::consts::TAU * i as f64 / n).cos())) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_starts_at_zero_and_peaks_mid_frame() {
        let window = hann(8);
        assert_eq!(window.len(), 8);
        assert!(window[0].abs() < 1e-7);
        assert!((window[4] - 1.0).abs() < 1e-7);
        assert!((window[2] - window[6]).abs() < 1e-6);
    }

    #[test]
    fn hann_of_zero_length_is_empty() {
        assert!(hann(0).is_empty());
    }
}
