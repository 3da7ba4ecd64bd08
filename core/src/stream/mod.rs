pub mod driver;
pub mod reader;

pub use driver::StreamingDriver;
pub use reader::{RawSnapshot, SnapshotReader, BYTES_PER_SAMPLE};
