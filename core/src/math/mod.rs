pub mod fft;
pub mod peaks;
pub mod stats;
pub mod window;

pub use fft::FftHelper;
pub use peaks::{LocalMaxima, PeakParams};
pub use stats::StatsHelper;
pub use window::hann;
