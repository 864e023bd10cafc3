//! Z-score noise rejection against a sliding window.

use crate::window::SlidingWindowStats;

/// Accept/reject decision for a reading based on its deviation from the
/// window mean, measured in standard deviations.
///
/// A reading further than `threshold` standard deviations from the mean is
/// rejected as noise. While the window holds fewer than 2 samples the
/// standard deviation is 0 and everything is accepted — a deliberate
/// cold-start policy: no filtering until the window has signal.
#[derive(Debug, Clone, Copy)]
pub struct NoiseFilter {
    threshold: f64,
}

impl NoiseFilter {
    /// Typical rejection threshold in standard deviations.
    pub const DEFAULT_THRESHOLD: f64 = 3.0;

    /// Create a filter rejecting beyond `threshold` standard deviations.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The configured threshold multiplier.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether `value` should be accepted given the current window.
    ///
    /// The decision is pure: identical window state yields an identical
    /// verdict for the same value.
    pub fn accept(&self, value: f64, window: &SlidingWindowStats) -> bool {
        let stddev = window.stddev();
        if stddev <= 0.0 {
            return true;
        }
        (value - window.mean()).abs() <= self.threshold * stddev
    }

    /// Deviation of `value` from the window mean in standard deviations.
    ///
    /// Returns 0 while the window has no measurable spread; used for log
    /// lines on rejection.
    pub fn deviation(&self, value: f64, window: &SlidingWindowStats) -> f64 {
        let stddev = window.stddev();
        if stddev <= 0.0 {
            return 0.0;
        }
        (value - window.mean()).abs() / stddev
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
