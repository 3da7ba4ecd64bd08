use anyhow::Context;
use chirpcore::prelude::{SearchConfig, StreamConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub sample_rate: f64,
    /// Prefix of every per-snapshot output file.
    pub output_prefix: String,
    pub snapshot_period: f64,
    pub frequency_offset: f64,
    pub frame_len: usize,
    pub sweep_start: f64,
    pub sweep_stop: f64,
    pub sweep_step: f64,
    pub min_distance: usize,
    pub exclude_border: bool,
    pub min_level_db: Option<f32>,
    /// Also write each snapshot's raw samples next to its report.
    pub write_samples: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let search = SearchConfig::default();
        let stream = StreamConfig::default();
        Self {
            sample_rate: stream.sample_rate,
            output_prefix: "lfms".into(),
            snapshot_period: stream.snapshot_period,
            frequency_offset: stream.frequency_offset,
            frame_len: search.frame_len,
            sweep_start: search.sweep_start,
            sweep_stop: search.sweep_stop,
            sweep_step: search.sweep_step,
            min_distance: search.min_distance,
            exclude_border: search.exclude_border,
            min_level_db: search.min_level_db,
            write_samples: false,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(sample_rate: f64, output_prefix: impl Into<String>) -> Self {
        Self {
            sample_rate,
            output_prefix: output_prefix.into(),
            ..Default::default()
        }
    }

    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            frame_len: self.frame_len,
            sweep_start: self.sweep_start,
            sweep_stop: self.sweep_stop,
            sweep_step: self.sweep_step,
            min_distance: self.min_distance,
            exclude_border: self.exclude_border,
            min_level_db: self.min_level_db,
        }
    }

    pub fn to_stream_config(&self) -> StreamConfig {
        StreamConfig {
            sample_rate: self.sample_rate,
            snapshot_period: self.snapshot_period,
            frequency_offset: self.frequency_offset,
        }
    }

    /// Checks both core configurations; any failure is fatal at startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.to_stream_config()
            .validate()
            .context("validating stream configuration")?;
        self.to_search_config()
            .validate()
            .context("validating search configuration")?;
        if self.output_prefix.is_empty() {
            anyhow::bail!("output prefix must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_uses_detector_defaults() {
        let cfg = WorkflowConfig::from_args(48_000.0, "out/run");
        let search = cfg.to_search_config();
        assert_eq!(search.frame_len, 16384);
        assert_eq!(search.min_distance, 100);
        assert!(search.exclude_border);
        assert_eq!(cfg.to_stream_config().snapshot_period, 240.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"sample_rate: 10000\noutput_prefix: capture\nframe_len: 4096\nmin_level_db: -20\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.sample_rate, 10_000.0);
        assert_eq!(cfg.frame_len, 4096);
        assert_eq!(cfg.min_level_db, Some(-20.0));
        assert_eq!(cfg.sweep_step, 0.002);
    }

    #[test]
    fn invalid_values_fail_validation() {
        let cfg = WorkflowConfig::from_args(-1.0, "out");
        assert!(cfg.validate().is_err());

        let cfg = WorkflowConfig {
            sweep_step: 0.0,
            ..WorkflowConfig::from_args(1_000.0, "out")
        };
        assert!(cfg.validate().is_err());
    }
}
