use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Bounded sliding window of scalar samples.
///
/// Appending to a full window evicts the oldest sample. An empty window
/// averages to `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticAggregator {
    values: VecDeque<f32>,
    capacity: usize,
}

impl StatisticAggregator {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "statistic window must hold at least one sample");
        StatisticAggregator {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, value: f32) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Mean of the last `min(window, len)` samples, `0.0` when there are none.
    ///
    /// `window` is clamped to the aggregator's capacity.
    pub fn moving_average(&self, window: usize) -> f32 {
        let n = window.min(self.capacity).min(self.values.len());
        if n == 0 {
            return 0.0;
        }
        let sum: f32 = self.values.iter().rev().take(n).sum();
        sum / n as f32
    }

    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from oldest to newest
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
