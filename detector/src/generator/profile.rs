use crate::generator::template::chirp_segment;
use anyhow::Context;
use chirpcore::stream::reader::encode_samples;
use num_complex::Complex32;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// One chirp injected into a synthetic recording, in physical units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChirpSpec {
    /// Seconds from the start of the recording.
    pub start: f64,
    pub duration: f64,
    /// Starting frequency in Hz.
    pub frequency: f64,
    /// Frequency slope in Hz/s.
    pub rate: f64,
    pub amplitude: f32,
}

/// Configuration for generating a synthetic I/Q recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub sample_rate: f64,
    /// Seconds of signal to generate.
    pub duration: f64,
    /// Standard deviation of the complex Gaussian noise floor.
    pub noise: f32,
    pub seed: u64,
    pub chirps: Vec<ChirpSpec>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 10_000.0,
            duration: 4.0,
            noise: 0.05,
            seed: 0,
            chirps: vec![ChirpSpec {
                start: 0.0,
                duration: 2.0,
                frequency: 1_000.0,
                rate: 50.0,
                amplitude: 1.0,
            }],
        }
    }
}

pub fn build_samples(config: &GeneratorConfig) -> anyhow::Result<Vec<Complex32>> {
    if !(config.sample_rate > 0.0 && config.duration >= 0.0) {
        anyhow::bail!(
            "generator needs a positive sample rate and non-negative duration, got {} Hz / {} s",
            config.sample_rate,
            config.duration
        );
    }
    let sample_count = (config.sample_rate * config.duration) as usize;
    let mut samples = vec![Complex32::new(0.0, 0.0); sample_count];

    let sr = config.sample_rate;
    for chirp in &config.chirps {
        let start = ((chirp.start * sr) as usize).min(sample_count);
        let length = ((chirp.duration * sr) as usize).min(sample_count - start);
        let segment = chirp_segment(
            length,
            chirp.frequency / sr,
            chirp.rate / (sr * sr),
            chirp.amplitude,
        );
        for (dst, src) in samples[start..start + length].iter_mut().zip(segment) {
            *dst += src;
        }
    }

    if config.noise > 0.0 {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let dist = Normal::new(0.0f32, config.noise / 2.0f32.sqrt())
            .context("building noise distribution for generator")?;
        for sample in samples.iter_mut() {
            *sample += Complex32::new(dist.sample(&mut rng), dist.sample(&mut rng));
        }
    }

    Ok(samples)
}

/// Synthetic recording in the detector's raw input format.
pub fn build_stream_bytes(config: &GeneratorConfig) -> anyhow::Result<Vec<u8>> {
    Ok(encode_samples(&build_samples(config)?))
}
