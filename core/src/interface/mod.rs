pub mod detection;
pub mod snapshot;

pub use detection::{Detection, DetectionRecord};
pub use snapshot::{SnapshotReport, SnapshotSink};
