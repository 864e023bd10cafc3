//! # driftwatch-engine
//!
//! The streaming statistics and filtering core shared by the edge and cloud
//! tiers of the driftwatch telemetry pipeline.
//!
//! This crate owns every piece of non-trivial numerical and state logic in
//! the system: bounded sliding-window statistics, z-score noise rejection,
//! tiered alert classification, periodic windowed aggregation, and online
//! percentile estimation for delivery latency. Transport, process wiring,
//! and CLI flags live elsewhere — nothing in here performs I/O beyond the
//! optional report sinks.
//!
//! ## Quick Start
//!
//! ```rust
//! use driftwatch_engine::{EdgeAggregator, EdgeConfig, IngestOutcome};
//! use driftwatch_types::{Millis, Reading};
//!
//! let edge = EdgeAggregator::new("edge-1", EdgeConfig::default());
//!
//! let reading = Reading {
//!     source_id: "sensor-a".into(),
//!     value: 50.2,
//!     produced_at: Millis(0),
//! };
//!
//! match edge.ingest(reading) {
//!     IngestOutcome::Accepted { filtered, alert } => {
//!         // forward `filtered`, publish `alert` if present
//!         assert!(alert.is_none());
//!         assert_eq!(filtered.relay_id, "edge-1");
//!     }
//!     IngestOutcome::Rejected { .. } => { /* dropped as noise */ }
//! }
//!
//! // Periodically, on the aggregation timer:
//! if let Some(summary) = edge.drain() {
//!     assert_eq!(summary.count, 1);
//! }
//! ```
//!
//! ## Crate layout
//!
//! - [`window`]: [`SlidingWindowStats`] and [`RunningTotals`] primitives
//! - [`filter`]: [`NoiseFilter`] z-score accept/reject decisions
//! - [`classify`]: [`AlertPolicy`] threshold and tiered classification
//! - [`signal`]: [`SignalGenerator`] synthetic sensor with drift/spike model
//! - [`latency`]: [`LatencyPercentileEstimator`] bounded p95/p99 estimation
//! - [`edge`]: [`EdgeAggregator`] per-relay filter + aggregate state
//! - [`cloud`]: [`CloudAggregator`] global fan-in statistics and reports
//! - [`reporter`]: periodic background [`StatsReport`] emission (tokio)
//!
//! [`StatsReport`]: driftwatch_types::StatsReport

pub mod classify;
pub mod cloud;
pub mod edge;
pub mod filter;
pub mod latency;
pub mod output;
#[cfg(feature = "tokio")]
pub mod reporter;
pub mod signal;
pub mod window;

pub use classify::{AlertPolicy, Band};
pub use cloud::{CloudAggregator, CloudConfig};
pub use edge::{EdgeAggregator, EdgeConfig, IngestOutcome};
pub use filter::NoiseFilter;
pub use latency::LatencyPercentileEstimator;
pub use output::Output;
#[cfg(feature = "tokio")]
pub use reporter::{EmissionHandle, Reporter, ReporterBuilder};
pub use signal::{DriftState, SignalConfig, SignalGenerator};
pub use window::{RunningTotals, SlidingWindowStats};

// Re-export message types for convenience
pub use driftwatch_types::{
    AggregateSummary, Alert, AlertClass, Envelope, FilteredReading, LatencyStats, Millis, Reading,
    StatsReport,
};
