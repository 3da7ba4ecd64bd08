use crate::gui_bridge::model::VisualizationModel;
use chirpcore::interface::{SnapshotReport, SnapshotSink};
use chirpcore::prelude::{DetectorError, DetectorResult};
use log::{error, info};
use num_complex::Complex32;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::Filter;

pub fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

fn read_model(state: &RwLock<VisualizationModel>) -> VisualizationModel {
    match state.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Keeps the latest snapshot report and serves it over HTTP on demand.
#[derive(Clone, Default)]
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
}

impl GuiBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the HTTP endpoint on a background thread: `GET /snapshot`.
    pub fn serve(&self, address: SocketAddr) {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());

        let snapshot_route = warp::path("snapshot")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<VisualizationModel>>| {
                warp::reply::json(&read_model(&state))
            });

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(snapshot_route).try_bind_ephemeral(address) {
                    Ok((bound, server)) => {
                        info!("[bridge] serving snapshots on http://{}/snapshot", bound);
                        server.await;
                    }
                    Err(err) => error!("[bridge] cannot bind {}: {}", address, err),
                }
            });
        });
    }

    pub fn publish_status(&self, message: &str) {
        if let Ok(mut guard) = self.state.write() {
            guard.status = message.to_string();
        }
        info!("[bridge] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> VisualizationModel {
        read_model(&self.state)
    }
}

impl SnapshotSink for GuiBridge {
    fn publish(&mut self, report: &SnapshotReport, _samples: &[Complex32]) -> DetectorResult<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| DetectorError::Sink("bridge state poisoned".into()))?;
        let published = guard.published + 1;
        *guard = VisualizationModel::from_report(report, published);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chirpcore::interface::DetectionRecord;

    fn record(level_db: f32) -> DetectionRecord {
        DetectionRecord {
            level_db,
            time_offset: 0.0,
            frequency: 100.0,
            chirp_rate: 5.0,
            duration: 1.0,
            frequency_span: 5.0,
            frame_index: 0,
            frequency_bin: 10,
        }
    }

    #[test]
    fn gui_bridge_updates_state() {
        let mut bridge = GuiBridge::new();
        let report = SnapshotReport {
            index: 3,
            time_offset: 720.0,
            sample_rate: 1_000.0,
            detections: vec![record(-20.0), record(-5.0)],
            ..Default::default()
        };
        bridge.publish(&report, &[]).unwrap();
        bridge.publish(&report, &[]).unwrap();

        let model = bridge.snapshot();
        assert_eq!(model.published, 2);
        assert_eq!(model.overlay_alphas.len(), 2);
        assert_eq!(model.report.unwrap().index, 3);
    }

    #[test]
    fn clones_share_state() {
        let bridge = GuiBridge::new();
        let mut handle = bridge.clone();
        handle.publish(&SnapshotReport::default(), &[]).unwrap();
        bridge.publish_status("done");
        let model = bridge.snapshot();
        assert_eq!(model.published, 1);
        assert_eq!(model.status, "done");
    }
}
