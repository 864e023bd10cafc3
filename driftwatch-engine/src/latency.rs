//! Bounded latency sampling with exact-on-sort percentile queries.

use std::collections::VecDeque;

use driftwatch_types::Millis;

/// Capped buffer of observed latencies (milliseconds) with percentile and
/// mean queries.
///
/// Newest samples append; the oldest falls off past capacity. A percentile
/// query sorts a copy of the retained samples — O(n log n) on a bounded n —
/// and never mutates the buffer, so a snapshot taken for reporting stays
/// stable for its whole lifetime.
#[derive(Debug, Clone)]
pub struct LatencyPercentileEstimator {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl LatencyPercentileEstimator {
    /// Create an estimator retaining the last `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one observed latency.
    pub fn record(&mut self, latency: Millis) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(latency.as_millis());
    }

    /// Number of samples currently retained.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Running mean latency in milliseconds (0 when empty).
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64
    }

    /// Exact percentile over a sorted copy of the retained samples.
    ///
    /// The index is `floor(len * p / 100)`, clamped to `len - 1`; an empty
    /// buffer yields 0.
    pub fn percentile(&self, p: f64) -> Millis {
        if self.samples.is_empty() {
            return Millis(0);
        }
        let mut sorted: Vec<u64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();

        let index = ((sorted.len() as f64 * p / 100.0).floor() as usize).min(sorted.len() - 1);
        Millis(sorted[index])
    }

    /// 95th percentile latency.
    pub fn p95(&self) -> Millis {
        self.percentile(95.0)
    }

    /// 99th percentile latency.
    pub fn p99(&self) -> Millis {
        self.percentile(99.0)
    }
}
