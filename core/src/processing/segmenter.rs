use num_complex::Complex32;
use std::slice::ChunksExact;

use crate::prelude::{DetectorError, DetectorResult};

/// Non-overlapping, fixed-length frames of a snapshot, in order.
///
/// A trailing remainder shorter than the frame length is dropped. A snapshot
/// shorter than one frame yields no frames at all.
#[derive(Clone)]
pub struct Frames<'a> {
    chunks: ChunksExact<'a, Complex32>,
    next_index: usize,
}

impl<'a> Frames<'a> {
    pub fn new(snapshot: &'a [Complex32], frame_len: usize) -> DetectorResult<Self> {
        if frame_len == 0 {
            return Err(DetectorError::InvalidParameter(
                "frame length must be positive".into(),
            ));
        }
        Ok(Self {
            chunks: snapshot.chunks_exact(frame_len),
            next_index: 0,
        })
    }

    /// Samples past the last whole frame.
    pub fn remainder(&self) -> &'a [Complex32] {
        self.chunks.remainder()
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = (usize, &'a [Complex32]);

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.chunks.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some((index, frame))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Splits `snapshot` into frames of `frame_len` samples.
pub fn segment(snapshot: &[Complex32], frame_len: usize) -> DetectorResult<Frames<'_>> {
    Frames::new(snapshot, frame_len)
}
