pub mod aggregator;
pub mod buffer_pool;
pub mod chirp_search;
pub mod pipeline;
pub mod segmenter;

pub use aggregator::Aggregator;
pub use buffer_pool::BufferPool;
pub use chirp_search::ChirpSearchStage;
pub use pipeline::SnapshotProcessor;
pub use segmenter::{segment, Frames};
