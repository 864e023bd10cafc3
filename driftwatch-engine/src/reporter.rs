//! Periodic background emission of statistics reports.

use std::sync::Arc;
use std::time::Duration;

use crate::cloud::CloudAggregator;
use crate::output::Output;

/// Emits a [`StatsReport`](driftwatch_types::StatsReport) from a
/// [`CloudAggregator`] to the configured outputs on a fixed interval.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use driftwatch_engine::{CloudAggregator, Output, Reporter};
///
/// #[tokio::main]
/// async fn main() {
///     let cloud = Arc::new(CloudAggregator::default());
///
///     let reporter = Reporter::builder()
///         .output(Output::Log)
///         .output(Output::file("stats.json"))
///         .interval(Duration::from_secs(10))
///         .build(cloud.clone());
///
///     // Start background emission; stop it via the handle on shutdown.
///     let handle = reporter.start();
///
///     // ... ingestion runs elsewhere ...
///
///     handle.stop();
/// }
/// ```
#[derive(Debug)]
pub struct Reporter {
    aggregator: Arc<CloudAggregator>,
    outputs: Arc<Vec<Output>>,
    interval: Duration,
}

impl Reporter {
    /// Create a builder for configuring the reporter.
    pub fn builder() -> ReporterBuilder {
        ReporterBuilder::new()
    }

    /// The configured emission interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start background emission.
    ///
    /// Spawns a tokio task that periodically snapshots the aggregator and
    /// emits to every output. The returned handle cancels the timer without
    /// touching already-ingested state.
    pub fn start(&self) -> EmissionHandle {
        use tokio::sync::watch;

        let (stop_tx, stop_rx) = watch::channel(false);
        let aggregator = self.aggregator.clone();
        let outputs = self.outputs.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let report = aggregator.snapshot();
                        for output in outputs.iter() {
                            if let Err(err) = output.emit(&report).await {
                                tracing::warn!(error = %err, "report emission failed");
                            }
                        }
                    }
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        EmissionHandle { stop_tx }
    }

    /// Emit one report to all outputs immediately.
    pub async fn emit_now(&self) {
        let report = self.aggregator.snapshot();
        for output in self.outputs.iter() {
            if let Err(err) = output.emit(&report).await {
                tracing::warn!(error = %err, "report emission failed");
            }
        }
    }
}

/// Builder for configuring a [`Reporter`].
#[derive(Debug, Default)]
pub struct ReporterBuilder {
    outputs: Vec<Output>,
    interval: Option<Duration>,
}

impl ReporterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; reports are emitted to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the emission interval (default 10 seconds).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Build the reporter over an aggregator.
    pub fn build(self, aggregator: Arc<CloudAggregator>) -> Reporter {
        Reporter {
            aggregator,
            outputs: Arc::new(self.outputs),
            interval: self.interval.unwrap_or(Duration::from_secs(10)),
        }
    }
}

/// Handle for controlling background emission.
///
/// Call [`stop`](Self::stop) explicitly, or drop the handle to stop
/// emission.
pub struct EmissionHandle {
    stop_tx: tokio::sync::watch::Sender<bool>,
}

impl EmissionHandle {
    /// Stop background emission.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_types::{FilteredReading, Millis};

    fn aggregator_with_data() -> Arc<CloudAggregator> {
        let cloud = Arc::new(CloudAggregator::default());
        cloud.ingest_reading_at(
            &FilteredReading {
                source_id: "sensor-1".to_string(),
                value: 42.0,
                produced_at: Millis(0),
                relay_id: "edge-1".to_string(),
            },
            Millis(30),
        );
        cloud
    }

    #[test]
    fn builder_defaults() {
        let reporter = Reporter::builder().build(Arc::new(CloudAggregator::default()));
        assert_eq!(reporter.interval(), Duration::from_secs(10));
        assert!(reporter.outputs.is_empty());
    }

    #[test]
    fn builder_accumulates_outputs() {
        let reporter = Reporter::builder()
            .output(Output::Log)
            .output(Output::file("stats.json"))
            .output(Output::tcp("localhost:9090"))
            .interval(Duration::from_millis(500))
            .build(Arc::new(CloudAggregator::default()));

        assert_eq!(reporter.outputs.len(), 3);
        assert_eq!(reporter.interval(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn emit_now_delivers_to_channel() {
        let (output, mut rx) = Output::channel(4);
        let reporter = Reporter::builder().output(output).build(aggregator_with_data());

        reporter.emit_now().await;

        let report = rx.recv().await.expect("report on channel");
        assert_eq!(report.total_readings, 1);
        assert_eq!(report.latency.mean_ms, 30.0);
    }

    #[tokio::test]
    async fn emit_now_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let reporter = Reporter::builder()
            .output(Output::file(&path))
            .build(aggregator_with_data());

        reporter.emit_now().await;

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: driftwatch_types::StatsReport = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.total_readings, 1);
    }

    #[tokio::test]
    async fn background_emission_ticks_and_stops() {
        let (output, mut rx) = Output::channel(16);
        let reporter = Reporter::builder()
            .output(output)
            .interval(Duration::from_millis(10))
            .build(aggregator_with_data());

        let handle = reporter.start();

        // The interval fires immediately, so at least one report arrives.
        let report = rx.recv().await.expect("first report");
        assert_eq!(report.total_readings, 1);

        handle.stop();
    }
}
