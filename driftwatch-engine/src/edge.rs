//! Per-relay filtering and windowed aggregation state.

use parking_lot::RwLock;

use driftwatch_types::{AggregateSummary, Alert, FilteredReading, Millis, Reading};

use crate::classify::AlertPolicy;
use crate::filter::NoiseFilter;
use crate::window::{RunningTotals, SlidingWindowStats};

/// Configuration for one edge relay instance.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Sliding-window capacity for the noise filter's statistics.
    pub window_capacity: usize,
    /// Noise rejection threshold in standard deviations.
    pub noise_threshold: f64,
    /// Active alert policy for this instance.
    pub policy: AlertPolicy,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            window_capacity: 10,
            noise_threshold: NoiseFilter::DEFAULT_THRESHOLD,
            policy: AlertPolicy::default_tiered(),
        }
    }
}

/// Window and totals mutated together under one lock.
#[derive(Debug)]
struct EdgeState {
    window: SlidingWindowStats,
    totals: RunningTotals,
}

/// The filtering and aggregation stage of one edge relay.
///
/// Owns its window and running totals exclusively — instances never share
/// state, so relays need no coordination between each other. Within an
/// instance, reading ingestion and the periodic drain run as concurrent
/// tasks against the same state and synchronize on the internal lock.
///
/// Ingestion never blocks on a full window (oldest-evict absorbs
/// backpressure) and drops input only through the noise filter, never for
/// capacity.
#[derive(Debug)]
pub struct EdgeAggregator {
    relay_id: String,
    filter: NoiseFilter,
    policy: AlertPolicy,
    state: RwLock<EdgeState>,
}

/// Verdict for one ingested reading.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The reading passed the filter; forward `filtered` and publish the
    /// alert if one was raised.
    Accepted {
        filtered: FilteredReading,
        alert: Option<Alert>,
    },
    /// The reading was rejected as noise and updated nothing.
    Rejected {
        /// Deviation from the window mean, in standard deviations.
        deviation: f64,
    },
}

impl EdgeAggregator {
    pub fn new(relay_id: impl Into<String>, config: EdgeConfig) -> Self {
        Self {
            relay_id: relay_id.into(),
            filter: NoiseFilter::new(config.noise_threshold),
            policy: config.policy,
            state: RwLock::new(EdgeState {
                window: SlidingWindowStats::new(config.window_capacity),
                totals: RunningTotals::new(),
            }),
        }
    }

    /// This relay's identity, stamped on everything it forwards.
    pub fn relay_id(&self) -> &str {
        &self.relay_id
    }

    /// Process one raw reading.
    ///
    /// A rejected reading updates neither the window nor the totals, so
    /// re-presenting it against identical window state repeats the same
    /// verdict. An accepted reading updates both and is returned stamped
    /// with this relay's identity, along with at most one alert.
    pub fn ingest(&self, reading: Reading) -> IngestOutcome {
        let mut state = self.state.write();

        if !self.filter.accept(reading.value, &state.window) {
            let deviation = self.filter.deviation(reading.value, &state.window);
            tracing::debug!(
                source_id = %reading.source_id,
                value = reading.value,
                deviation,
                "rejected reading as noise"
            );
            return IngestOutcome::Rejected { deviation };
        }

        state.window.push(reading.value);
        state.totals.observe(reading.value);
        drop(state);

        let filtered = reading.forwarded_by(self.relay_id.clone());
        let alert = self.policy.alert(&filtered);
        if let Some(ref alert) = alert {
            tracing::debug!(
                source_id = %alert.source_id,
                value = alert.value,
                class = alert.class.label(),
                "raised alert"
            );
        }

        IngestOutcome::Accepted { filtered, alert }
    }

    /// Emit the aggregate over everything ingested since the previous
    /// drain, then reset.
    ///
    /// Returns `None` when nothing was observed since the last drain. On
    /// emission the totals return to their zero state and the window is
    /// cleared; this is the only mutation of the totals besides ingestion.
    pub fn drain(&self) -> Option<AggregateSummary> {
        self.drain_at(Millis::now())
    }

    /// [`drain`](Self::drain) with an explicit emission timestamp.
    pub fn drain_at(&self, emitted_at: Millis) -> Option<AggregateSummary> {
        let mut state = self.state.write();
        if state.totals.count == 0 {
            return None;
        }

        let summary = AggregateSummary {
            relay_id: self.relay_id.clone(),
            count: state.totals.count,
            mean: state.totals.mean(),
            min: state.totals.min,
            max: state.totals.max,
            emitted_at,
        };

        state.totals.reset();
        state.window.clear();
        Some(summary)
    }

    /// Readings accepted since the last drain.
    pub fn pending_count(&self) -> u64 {
        self.state.read().totals.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_types::AlertClass;

    fn reading(value: f64) -> Reading {
        Reading {
            source_id: "sensor-1".to_string(),
            value,
            produced_at: Millis(500),
        }
    }

    fn edge() -> EdgeAggregator {
        EdgeAggregator::new("edge-1", EdgeConfig::default())
    }

    #[test]
    fn cold_start_accepts_everything() {
        let edge = edge();
        // First two readings land with no filtering history.
        for value in [1e6, -1e6] {
            match edge.ingest(reading(value)) {
                IngestOutcome::Accepted { filtered, .. } => {
                    assert_eq!(filtered.relay_id, "edge-1");
                    assert_eq!(filtered.value, value);
                }
                IngestOutcome::Rejected { .. } => panic!("cold start must accept"),
            }
        }
    }

    #[test]
    fn outlier_rejected_once_window_has_signal() {
        let edge = edge();
        // Build a window with mean 50, stddev 10.
        edge.ingest(reading(40.0));
        edge.ingest(reading(60.0));

        // 81 deviates 3.1 sigma: rejected.
        let outcome = edge.ingest(reading(81.0));
        assert!(matches!(outcome, IngestOutcome::Rejected { deviation } if deviation > 3.0));

        // 79 deviates 2.9 sigma: accepted.
        let outcome = edge.ingest(reading(79.0));
        assert!(matches!(outcome, IngestOutcome::Accepted { .. }));
    }

    #[test]
    fn rejected_reading_updates_nothing() {
        let edge = edge();
        edge.ingest(reading(40.0));
        edge.ingest(reading(60.0));
        assert_eq!(edge.pending_count(), 2);

        let first = edge.ingest(reading(81.0));
        assert_eq!(edge.pending_count(), 2);

        // Identical window state: the repeat verdict is identical too.
        let second = edge.ingest(reading(81.0));
        assert_eq!(first, second);
    }

    #[test]
    fn accepted_reading_raises_alert_per_policy() {
        let config = EdgeConfig {
            policy: AlertPolicy::Static { min: 0.0, max: 200.0 },
            ..EdgeConfig::default()
        };
        let edge = EdgeAggregator::new("edge-1", config);

        let outcome = edge.ingest(reading(-5.0));
        match outcome {
            IngestOutcome::Accepted { alert, .. } => {
                let alert = alert.expect("below-min value must alert");
                assert_eq!(alert.class, AlertClass::ThresholdLow);
                assert_eq!(alert.relay_id, "edge-1");
            }
            IngestOutcome::Rejected { .. } => panic!("cold-start reading must be accepted"),
        }
    }

    #[test]
    fn nominal_reading_raises_no_alert() {
        let edge = edge();
        match edge.ingest(reading(50.0)) {
            IngestOutcome::Accepted { alert, .. } => assert!(alert.is_none()),
            IngestOutcome::Rejected { .. } => panic!("must accept"),
        }
    }

    #[test]
    fn drain_summarizes_and_resets() {
        let edge = edge();
        for value in [10.0, 20.0, 30.0] {
            edge.ingest(reading(value));
        }

        let summary = edge.drain_at(Millis(9000)).expect("data was ingested");
        assert_eq!(summary.relay_id, "edge-1");
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 20.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.emitted_at, Millis(9000));

        assert_eq!(edge.pending_count(), 0);
    }

    #[test]
    fn second_drain_without_ingestion_returns_none() {
        let edge = edge();
        edge.ingest(reading(42.0));
        assert!(edge.drain_at(Millis(1)).is_some());
        assert!(edge.drain_at(Millis(2)).is_none());
    }

    #[test]
    fn drain_on_idle_instance_returns_none() {
        let edge = edge();
        assert!(edge.drain_at(Millis(1)).is_none());
    }

    #[test]
    fn drain_clears_filter_window() {
        let edge = edge();
        edge.ingest(reading(40.0));
        edge.ingest(reading(60.0));
        edge.drain_at(Millis(1));

        // Window cleared: the filter is back in cold start and accepts an
        // outlier the pre-drain window would have rejected.
        assert!(matches!(
            edge.ingest(reading(81.0)),
            IngestOutcome::Accepted { .. }
        ));
    }

    #[test]
    fn concurrent_ingestion_and_drain() {
        use std::sync::Arc;
        use std::thread;

        let edge = Arc::new(edge());
        let mut handles = vec![];

        for t in 0..4 {
            let edge = edge.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    // A flat signal has zero spread, so the filter never
                    // rejects and the accounting below is exact.
                    edge.ingest(Reading {
                        source_id: format!("sensor-{t}"),
                        value: 50.0,
                        produced_at: Millis(0),
                    });
                }
            }));
        }

        let drainer = {
            let edge = edge.clone();
            thread::spawn(move || {
                let mut drained = 0u64;
                for _ in 0..20 {
                    if let Some(summary) = edge.drain_at(Millis(0)) {
                        drained += summary.count;
                    }
                    thread::yield_now();
                }
                drained
            })
        };

        for handle in handles {
            handle.join().unwrap();
        }
        let drained = drainer.join().unwrap();
        let remaining = edge.pending_count();

        // Every accepted reading lands in exactly one drain or is pending.
        assert_eq!(drained + remaining, 1000);
    }
}
