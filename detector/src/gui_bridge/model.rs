use chirpcore::interface::SnapshotReport;
use serde::{Deserialize, Serialize};

/// Latest snapshot as served to an external waterfall renderer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub report: Option<SnapshotReport>,
    /// Opacity per detection, in report order.
    pub overlay_alphas: Vec<f32>,
    pub published: usize,
    pub status: String,
}

impl VisualizationModel {
    pub fn from_report(report: &SnapshotReport, published: usize) -> Self {
        Self {
            overlay_alphas: report.overlay_alphas(),
            report: Some(report.clone()),
            published,
            status: format!(
                "snapshot {} at {:.1}s with {} detections",
                report.index,
                report.time_offset,
                report.detections.len()
            ),
        }
    }
}
