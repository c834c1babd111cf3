use std::collections::VecDeque;

use super::sample::Sample;

pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// Fixed-capacity FIFO buffer of the most recent samples.
///
/// Samples are appended as whole units; one aligned `Sample` per tick keeps
/// the per-metric series from drifting out of step. Owned exclusively by the
/// scheduler; readers only ever see copies via `snapshot`.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Push a sample to the back, evicting the oldest when full
    pub fn append(&mut self, sample: Sample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Point-in-time copy of the window contents, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}
