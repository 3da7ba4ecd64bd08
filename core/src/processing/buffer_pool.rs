use crate::prelude::DetectorError;

/// Simple scoped buffer pool that prevents unbounded allocations.
pub struct BufferPool<T> {
    buffers: Vec<Vec<T>>,
    outstanding: usize,
    max_capacity: usize,
}

impl<T: Clone + Default> BufferPool<T> {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            outstanding: 0,
            max_capacity,
        }
    }

    /// Hands out a buffer of `length` default values, reusing a released one when possible.
    pub fn checkout(&mut self, length: usize) -> Result<Vec<T>, DetectorError> {
        if self.outstanding >= self.max_capacity {
            return Err(DetectorError::BufferExhaustion("pool depleted".to_string()));
        }
        self.outstanding += 1;
        if let Some(mut buffer) = self.buffers.pop() {
            buffer.resize(length, T::default());
            Ok(buffer)
        } else {
            Ok(vec![T::default(); length])
        }
    }

    /// Returns a buffer back to the pool for reuse.
    pub fn release(&mut self, mut buffer: Vec<T>) {
        buffer.clear();
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }

    pub fn available(&self) -> usize {
        self.buffers.len()
    }

    pub fn reset(&mut self) {
        self.buffers.clear();
        self.outstanding = 0;
    }
}
