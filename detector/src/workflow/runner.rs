use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use chirpcore::interface::SnapshotSink;
use chirpcore::stream::StreamingDriver;
use chirpcore::telemetry::Metrics;
use std::io::Read;

pub struct WorkflowResult {
    pub metrics: Metrics,
    /// Stream time reached when the input ran out, in seconds.
    pub elapsed: f64,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute<R: Read>(
        &self,
        source: R,
        sink: &mut dyn SnapshotSink,
    ) -> anyhow::Result<WorkflowResult> {
        let mut driver = StreamingDriver::new(
            &self.config.to_search_config(),
            &self.config.to_stream_config(),
        )
        .context("initializing streaming driver")?;
        let metrics = driver.run(source, sink).context("running detector")?;

        Ok(WorkflowResult {
            metrics,
            elapsed: driver.time_offset(),
        })
    }
}
