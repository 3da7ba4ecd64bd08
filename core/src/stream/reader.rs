use num_complex::Complex32;
use std::io::{ErrorKind, Read};

use crate::prelude::{DetectorError, DetectorResult};

/// Interleaved little-endian `f32` I and Q.
pub const BYTES_PER_SAMPLE: usize = 8;

/// One chunk read from the input stream.
#[derive(Debug, Clone, Default)]
pub struct RawSnapshot {
    pub samples: Vec<Complex32>,
    /// Trailing bytes that did not form a whole sample.
    pub dropped_bytes: usize,
}

/// Reads fixed-size snapshots of raw I/Q samples until the source is exhausted.
pub struct SnapshotReader<R> {
    source: R,
    chunk: Vec<u8>,
}

impl<R: Read> SnapshotReader<R> {
    pub fn new(source: R, samples_per_snapshot: usize) -> DetectorResult<Self> {
        if samples_per_snapshot == 0 {
            return Err(DetectorError::InvalidConfiguration(
                "snapshot must hold at least one sample".into(),
            ));
        }
        let bytes = samples_per_snapshot
            .checked_mul(BYTES_PER_SAMPLE)
            .ok_or_else(|| DetectorError::InvalidConfiguration("snapshot size overflows".into()))?;
        Ok(Self {
            source,
            chunk: vec![0; bytes],
        })
    }

    /// Next snapshot, or `None` once a read returns zero bytes.
    ///
    /// Blocks until the chunk is full or the source ends; the final snapshot
    /// may be short.
    pub fn next_snapshot(&mut self) -> DetectorResult<Option<RawSnapshot>> {
        let mut filled = 0;
        while filled < self.chunk.len() {
            match self.source.read(&mut self.chunk[filled..]) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(DetectorError::Io(err)),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        Ok(Some(decode_samples(&self.chunk[..filled])))
    }
}

/// Decodes whole samples and counts the bytes of an incomplete trailing one.
pub fn decode_samples(bytes: &[u8]) -> RawSnapshot {
    let chunks = bytes.chunks_exact(BYTES_PER_SAMPLE);
    let dropped_bytes = chunks.remainder().len();
    let samples = chunks
        .map(|sample| {
            let re = f32::from_le_bytes([sample[0], sample[1], sample[2], sample[3]]);
            let im = f32::from_le_bytes([sample[4], sample[5], sample[6], sample[7]]);
            Complex32::new(re, im)
        })
        .collect();
    RawSnapshot {
        samples,
        dropped_bytes,
    }
}

/// Encodes samples in the reader's wire format.
pub fn encode_samples(samples: &[Complex32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for sample in samples {
        bytes.extend_from_slice(&sample.re.to_le_bytes());
        bytes.extend_from_slice(&sample.im.to_le_bytes());
    }
    bytes
}
