//! Global fan-in statistics across all relays.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use driftwatch_types::{
    AggregateSummary, Alert, AlertClass, FilteredReading, LatencyStats, Millis, SchemaVersion,
    StatsReport,
};

use crate::latency::LatencyPercentileEstimator;
use crate::window::{RunningTotals, SlidingWindowStats};

/// Retention caps for the cloud tier.
#[derive(Debug, Clone, Copy)]
pub struct CloudConfig {
    /// Sliding-window capacity for global mean/stddev.
    pub max_readings: usize,
    /// Alert FIFO capacity.
    pub max_alerts: usize,
    /// Latency sample buffer capacity.
    pub max_latencies: usize,
    /// Trailing mean-latency history points retained across snapshots.
    pub history_points: usize,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            max_readings: 10_000,
            max_alerts: 1_000,
            max_latencies: 10_000,
            history_points: 60,
        }
    }
}

#[derive(Debug)]
struct CloudState {
    window: SlidingWindowStats,
    totals: RunningTotals,
    per_relay: BTreeMap<String, u64>,
    alerts: VecDeque<Alert>,
    alerts_by_class: BTreeMap<AlertClass, u64>,
    alerts_total: u64,
    latencies: LatencyPercentileEstimator,
    latency_history: VecDeque<f64>,
}

/// The cloud tier's aggregation state: global window, per-relay tallies,
/// capped alert log, and latency percentiles, all behind one lock.
///
/// Ingestion paths take the write lock briefly; `snapshot` computes under a
/// shared (upgradable) read so percentile sorting never excludes other
/// readers, and upgrades only to append the history point.
#[derive(Debug)]
pub struct CloudAggregator {
    config: CloudConfig,
    started_at: Instant,
    state: RwLock<CloudState>,
}

impl CloudAggregator {
    pub fn new(config: CloudConfig) -> Self {
        Self {
            config,
            started_at: Instant::now(),
            state: RwLock::new(CloudState {
                window: SlidingWindowStats::new(config.max_readings),
                totals: RunningTotals::new(),
                per_relay: BTreeMap::new(),
                alerts: VecDeque::new(),
                alerts_by_class: BTreeMap::new(),
                alerts_total: 0,
                latencies: LatencyPercentileEstimator::new(config.max_latencies),
                latency_history: VecDeque::new(),
            }),
        }
    }

    /// Fold one forwarded reading into the global statistics.
    ///
    /// Delivery latency is measured against the reading's production
    /// timestamp; a producer clock ahead of ours clamps to zero.
    pub fn ingest_reading(&self, reading: &FilteredReading) {
        self.ingest_reading_at(reading, Millis::now());
    }

    /// [`ingest_reading`](Self::ingest_reading) with an explicit arrival time.
    pub fn ingest_reading_at(&self, reading: &FilteredReading, now: Millis) {
        let latency = now.saturating_since(reading.produced_at);

        let mut state = self.state.write();
        state.totals.observe(reading.value);
        state.window.push(reading.value);
        *state.per_relay.entry(reading.relay_id.clone()).or_insert(0) += 1;
        state.latencies.record(latency);
    }

    /// Credit a relay's periodic aggregate to its reading tally.
    pub fn ingest_summary(&self, summary: &AggregateSummary) {
        let mut state = self.state.write();
        *state.per_relay.entry(summary.relay_id.clone()).or_insert(0) += summary.count;
        tracing::debug!(
            relay_id = %summary.relay_id,
            count = summary.count,
            mean = summary.mean,
            "relay aggregate received"
        );
    }

    /// Retain an alert (oldest evicted past capacity) and count its class.
    pub fn ingest_alert(&self, alert: Alert) {
        let mut state = self.state.write();
        state.alerts_total += 1;
        *state.alerts_by_class.entry(alert.class).or_insert(0) += 1;
        if state.alerts.len() == self.config.max_alerts {
            state.alerts.pop_front();
        }
        tracing::info!(
            source_id = %alert.source_id,
            relay_id = %alert.relay_id,
            value = alert.value,
            class = alert.class.label(),
            message = %alert.message,
            "alert received"
        );
        state.alerts.push_back(alert);
    }

    /// Compute the composite report.
    pub fn snapshot(&self) -> StatsReport {
        self.snapshot_at(Millis::now())
    }

    /// [`snapshot`](Self::snapshot) with an explicit generation timestamp.
    pub fn snapshot_at(&self, generated_at: Millis) -> StatsReport {
        let state = self.state.upgradable_read();

        let elapsed = self.started_at.elapsed().as_secs_f64();
        let readings_per_sec = if elapsed > 0.0 {
            state.totals.count as f64 / elapsed
        } else {
            0.0
        };

        let latency = LatencyStats {
            samples: state.latencies.len(),
            mean_ms: state.latencies.mean(),
            p95: state.latencies.p95(),
            p99: state.latencies.p99(),
        };

        let mut report = StatsReport {
            version: SchemaVersion::current(),
            generated_at,
            total_readings: state.totals.count,
            readings_per_sec,
            mean: state.window.mean(),
            stddev: state.window.stddev(),
            min: state.totals.min_or_zero(),
            max: state.totals.max_or_zero(),
            relays: state.per_relay.clone(),
            alerts_total: state.alerts_total,
            alerts_by_class: state.alerts_by_class.clone(),
            latency,
            latency_history: Vec::new(),
        };

        // The history ring is the one piece of ingestion-side state a
        // snapshot mutates; upgrade just long enough to append to it.
        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        if state.latency_history.len() == self.config.history_points {
            state.latency_history.pop_front();
        }
        let point = report.latency.mean_ms;
        state.latency_history.push_back(point);
        report.latency_history = state.latency_history.iter().copied().collect();

        report
    }

    /// The retained alert FIFO, oldest first.
    pub fn recent_alerts(&self) -> Vec<Alert> {
        self.state.read().alerts.iter().cloned().collect()
    }
}

impl Default for CloudAggregator {
    fn default() -> Self {
        Self::new(CloudConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded(value: f64, relay: &str, produced_at: u64) -> FilteredReading {
        FilteredReading {
            source_id: "sensor-1".to_string(),
            value,
            produced_at: Millis(produced_at),
            relay_id: relay.to_string(),
        }
    }

    fn alert(class: AlertClass) -> Alert {
        Alert {
            source_id: "sensor-1".to_string(),
            value: 120.0,
            produced_at: Millis(0),
            relay_id: "edge-1".to_string(),
            class,
            message: "test".to_string(),
        }
    }

    #[test]
    fn ingest_then_snapshot_basic_stats() {
        let cloud = CloudAggregator::default();
        for value in [10.0, 20.0, 30.0] {
            cloud.ingest_reading_at(&forwarded(value, "edge-1", 0), Millis(5));
        }

        let report = cloud.snapshot_at(Millis(100));
        assert_eq!(report.total_readings, 3);
        assert_eq!(report.mean, 20.0);
        assert_eq!(report.min, 10.0);
        assert_eq!(report.max, 30.0);
        assert_eq!(report.relays.get("edge-1"), Some(&3));
    }

    #[test]
    fn empty_snapshot_is_neutral() {
        let cloud = CloudAggregator::default();
        let report = cloud.snapshot_at(Millis(0));
        assert_eq!(report.total_readings, 0);
        assert_eq!(report.mean, 0.0);
        assert_eq!(report.stddev, 0.0);
        assert_eq!(report.min, 0.0);
        assert_eq!(report.max, 0.0);
        assert_eq!(report.latency.p95, Millis(0));
    }

    #[test]
    fn latency_measured_and_clamped() {
        let cloud = CloudAggregator::default();
        // 40ms in flight.
        cloud.ingest_reading_at(&forwarded(1.0, "edge-1", 1000), Millis(1040));
        // Producer clock 500ms ahead of ours: clamps to zero.
        cloud.ingest_reading_at(&forwarded(2.0, "edge-1", 2000), Millis(1500));

        let report = cloud.snapshot_at(Millis(0));
        assert_eq!(report.latency.samples, 2);
        assert_eq!(report.latency.mean_ms, 20.0);
    }

    #[test]
    fn summaries_credit_relay_tallies() {
        let cloud = CloudAggregator::default();
        cloud.ingest_reading_at(&forwarded(1.0, "edge-1", 0), Millis(0));
        cloud.ingest_summary(&AggregateSummary {
            relay_id: "edge-2".to_string(),
            count: 7,
            mean: 50.0,
            min: 45.0,
            max: 55.0,
            emitted_at: Millis(0),
        });

        let report = cloud.snapshot_at(Millis(0));
        assert_eq!(report.relays.get("edge-1"), Some(&1));
        assert_eq!(report.relays.get("edge-2"), Some(&7));
        assert_eq!(report.relay_count(), 2);
    }

    #[test]
    fn alert_log_caps_fifo_and_counts_by_class() {
        let config = CloudConfig {
            max_alerts: 2,
            ..CloudConfig::default()
        };
        let cloud = CloudAggregator::new(config);

        cloud.ingest_alert(alert(AlertClass::Warning));
        cloud.ingest_alert(alert(AlertClass::Critical));
        cloud.ingest_alert(alert(AlertClass::Critical));

        let retained = cloud.recent_alerts();
        assert_eq!(retained.len(), 2);
        // The oldest (warning) was evicted from the log...
        assert!(retained.iter().all(|a| a.class == AlertClass::Critical));

        // ...but the class counters are monotonic.
        let report = cloud.snapshot_at(Millis(0));
        assert_eq!(report.alerts_total, 3);
        assert_eq!(report.alerts_by_class.get(&AlertClass::Warning), Some(&1));
        assert_eq!(report.alerts_by_class.get(&AlertClass::Critical), Some(&2));
    }

    #[test]
    fn reading_window_caps_at_configured_size() {
        let config = CloudConfig {
            max_readings: 3,
            ..CloudConfig::default()
        };
        let cloud = CloudAggregator::new(config);
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            cloud.ingest_reading_at(&forwarded(value, "edge-1", 0), Millis(0));
        }

        let report = cloud.snapshot_at(Millis(0));
        // Window mean covers only the last 3 readings...
        assert_eq!(report.mean, 4.0);
        // ...while totals stay monotonic over everything.
        assert_eq!(report.total_readings, 5);
        assert_eq!(report.min, 1.0);
        assert_eq!(report.max, 5.0);
    }

    #[test]
    fn snapshot_appends_one_history_point_per_call() {
        let config = CloudConfig {
            history_points: 3,
            ..CloudConfig::default()
        };
        let cloud = CloudAggregator::new(config);
        cloud.ingest_reading_at(&forwarded(1.0, "edge-1", 0), Millis(10));

        for i in 0..5 {
            let report = cloud.snapshot_at(Millis(i));
            assert_eq!(report.latency_history.len(), (i as usize + 1).min(3));
        }
    }

    #[test]
    fn snapshot_does_not_disturb_ingestion_state() {
        let cloud = CloudAggregator::default();
        for value in [10.0, 20.0] {
            cloud.ingest_reading_at(&forwarded(value, "edge-1", 0), Millis(0));
        }
        let first = cloud.snapshot_at(Millis(0));
        let second = cloud.snapshot_at(Millis(0));
        assert_eq!(first.total_readings, second.total_readings);
        assert_eq!(first.mean, second.mean);
        assert_eq!(first.latency.p95, second.latency.p95);
    }

    #[test]
    fn percentiles_flow_through_report() {
        let cloud = CloudAggregator::default();
        for i in 1..=100u64 {
            cloud.ingest_reading_at(&forwarded(50.0, "edge-1", 0), Millis(i * 10));
        }
        let report = cloud.snapshot_at(Millis(0));
        assert_eq!(report.latency.p95, Millis(960));
        assert_eq!(report.latency.p99, Millis(1000));
    }
}
