//! Millisecond timestamps and durations.
//!
//! The pipeline uses unix-epoch milliseconds as the canonical unit for both
//! message timestamps and observed latencies, so one wrapper serves both and
//! serializes identically across formats and languages.

use core::time::Duration;

/// A count of milliseconds.
///
/// Used as a unix-epoch timestamp (`produced_at`, `emitted_at`) and as a
/// latency measurement. A `u64` holds ~584 million years of milliseconds,
/// so overflow is not a practical concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Millis(pub u64);

impl Millis {
    /// Create from milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Create from seconds.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    /// Get the value in milliseconds.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Get the value in seconds (truncated).
    pub const fn as_secs(&self) -> u64 {
        self.0 / 1000
    }

    /// Convert to a standard Duration.
    pub const fn to_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Elapsed milliseconds since `earlier`, clamped to zero.
    ///
    /// Timestamps arrive from other hosts, so `earlier` may sit in our
    /// future; skewed clocks yield zero rather than an error.
    pub const fn saturating_since(&self, earlier: Millis) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }

    /// The current wall-clock time in unix-epoch milliseconds.
    #[cfg(feature = "std")]
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        Self(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
        )
    }
}

impl From<Duration> for Millis {
    fn from(d: Duration) -> Self {
        Self(d.as_millis() as u64)
    }
}

impl From<Millis> for Duration {
    fn from(m: Millis) -> Self {
        Duration::from_millis(m.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        let d = Duration::from_millis(1500);
        let m = Millis::from(d);
        assert_eq!(m.as_millis(), 1500);
        assert_eq!(m.as_secs(), 1);

        let d2: Duration = m.into();
        assert_eq!(d, d2);
    }

    #[test]
    fn from_secs() {
        let m = Millis::from_secs(5);
        assert_eq!(m.as_millis(), 5000);
        assert_eq!(m.to_duration(), Duration::from_secs(5));
    }

    #[test]
    fn saturating_since_forward() {
        let produced = Millis(1000);
        let now = Millis(1750);
        assert_eq!(now.saturating_since(produced), Millis(750));
    }

    #[test]
    fn saturating_since_clamps_clock_skew() {
        // A producer clock ahead of ours must clamp to zero, not error.
        let produced = Millis(2000);
        let now = Millis(1750);
        assert_eq!(now.saturating_since(produced), Millis(0));
    }

    #[test]
    fn ordering() {
        let a = Millis::from_secs(1);
        let b = Millis::from_secs(2);
        assert!(a < b);
        assert_eq!(a, Millis(1000));
    }

    #[cfg(feature = "std")]
    #[test]
    fn now_is_recent() {
        // now() must land within the test's own wall-clock bracket.
        let before = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let now = Millis::now();
        assert!(now.as_millis() >= before);
    }
}
