use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Counters accumulated over a detector run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub snapshots: usize,
    pub skipped: usize,
    pub frames: usize,
    pub detections: usize,
    pub malformed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_snapshot(&self, frames: usize, detections: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.snapshots += 1;
            metrics.frames += frames;
            metrics.detections += detections;
        }
    }

    pub fn record_skipped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.skipped += 1;
        }
    }

    pub fn record_malformed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.malformed += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
