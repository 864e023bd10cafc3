//! The cloud tier's composite statistics report.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{AlertClass, Millis, SchemaVersion};

/// Latency statistics over the cloud tier's bounded sample buffer.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatencyStats {
    /// Number of samples currently retained.
    pub samples: usize,
    /// Running mean latency in milliseconds.
    pub mean_ms: f64,
    /// 95th percentile latency.
    pub p95: Millis,
    /// 99th percentile latency.
    pub p99: Millis,
}

/// Point-in-time global statistics across all relays.
///
/// Emitted periodically by the cloud aggregator and served on demand. A
/// report is a value snapshot; producing one never blocks ingestion beyond
/// the percentile sort.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsReport {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,
    /// Unix-epoch milliseconds when this report was generated.
    pub generated_at: Millis,
    /// Total readings ingested since startup (monotonic).
    pub total_readings: u64,
    /// Ingestion rate since startup.
    pub readings_per_sec: f64,
    /// Mean over the retained reading window.
    pub mean: f64,
    /// Population standard deviation over the retained reading window.
    pub stddev: f64,
    /// Smallest value ever ingested (0 when nothing ingested).
    pub min: f64,
    /// Largest value ever ingested (0 when nothing ingested).
    pub max: f64,
    /// Reading counts keyed by relay identity.
    pub relays: BTreeMap<String, u64>,
    /// Total alerts received since startup (monotonic).
    pub alerts_total: u64,
    /// Alert counts keyed by class.
    pub alerts_by_class: BTreeMap<AlertClass, u64>,
    /// Delivery latency statistics.
    pub latency: LatencyStats,
    /// Trailing mean-latency points (milliseconds), oldest first.
    pub latency_history: Vec<f64>,
}

impl StatsReport {
    /// An empty report at the given timestamp.
    pub fn empty(generated_at: Millis) -> Self {
        Self {
            version: SchemaVersion::current(),
            generated_at,
            total_readings: 0,
            readings_per_sec: 0.0,
            mean: 0.0,
            stddev: 0.0,
            min: 0.0,
            max: 0.0,
            relays: BTreeMap::new(),
            alerts_total: 0,
            alerts_by_class: BTreeMap::new(),
            latency: LatencyStats::default(),
            latency_history: Vec::new(),
        }
    }

    /// Number of relays that have reported at least one reading.
    pub fn relay_count(&self) -> usize {
        self.relays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn empty_report_has_neutral_values() {
        let report = StatsReport::empty(Millis(1000));
        assert_eq!(report.total_readings, 0);
        assert_eq!(report.mean, 0.0);
        assert_eq!(report.latency.p95, Millis(0));
        assert_eq!(report.relay_count(), 0);
        assert!(report.version.is_compatible());
    }

    #[test]
    fn relay_count_tracks_map() {
        let mut report = StatsReport::empty(Millis(0));
        report.relays.insert("edge-1".to_string(), 10);
        report.relays.insert("edge-2".to_string(), 4);
        assert_eq!(report.relay_count(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn report_roundtrip() {
        let mut report = StatsReport::empty(Millis(1_703_160_000_000));
        report.total_readings = 42;
        report.mean = 50.2;
        report.relays.insert("edge-1".to_string(), 42);
        report.alerts_by_class.insert(AlertClass::Warning, 3);
        report.alerts_total = 3;
        report.latency = LatencyStats {
            samples: 42,
            mean_ms: 12.5,
            p95: Millis(30),
            p99: Millis(55),
        };
        report.latency_history.push(12.5);

        let json = serde_json::to_string(&report).unwrap();
        let parsed: StatsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn alert_class_map_keys_are_snake_case() {
        let mut report = StatsReport::empty(Millis(0));
        report.alerts_by_class.insert(AlertClass::ThresholdLow, 1);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains(r#""threshold_low":1"#));
    }
}
