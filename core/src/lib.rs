//! Chirp-search core for detecting linearly-frequency-modulated segments in
//! raw I/Q sample streams.
//!
//! Snapshots of the stream are cut into fixed-length frames. Each frame is
//! windowed, de-chirped against a sweep of candidate chirp rates and
//! transformed; peaks of the resulting rate × frequency field become
//! detections, which are then mapped into stream time and physical units.

pub mod interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod stream;
pub mod telemetry;

pub use interface::{Detection, DetectionRecord, SnapshotReport, SnapshotSink};
pub use prelude::{
    DetectorError, DetectorResult, ProcessingStage, SearchConfig, StageInput, StageOutput,
    StreamConfig,
};
pub use stream::StreamingDriver;
