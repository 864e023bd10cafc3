//! Report sinks for the periodic reporter.

use std::path::PathBuf;

use driftwatch_types::StatsReport;

/// Destination for emitted statistics reports.
#[derive(Debug)]
pub enum Output {
    /// Render a human-readable summary to the log.
    Log,

    /// Write the report to a JSON file.
    ///
    /// The file is overwritten with each report.
    File(PathBuf),

    /// Send reports to a TCP server as newline-delimited JSON (best effort).
    Tcp(String),

    /// Send reports through a channel.
    ///
    /// Use [`Output::channel`] to create this variant and get the receiver.
    #[cfg(feature = "tokio")]
    Channel(tokio::sync::mpsc::Sender<StatsReport>),
}

impl Output {
    /// Create a file output.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    #[cfg(feature = "tokio")]
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<StatsReport>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit a report to this output.
    #[cfg(feature = "tokio")]
    pub(crate) async fn emit(&self, report: &StatsReport) -> std::io::Result<()> {
        match self {
            Output::Log => {
                log_report(report);
            }
            Output::File(path) => {
                let json = serde_json::to_string_pretty(report)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Tcp(addr) => {
                use tokio::io::AsyncWriteExt;
                use tokio::net::TcpStream;

                // Try to connect and send (best effort)
                if let Ok(mut stream) = TcpStream::connect(addr).await {
                    let json = serde_json::to_string(report)?;
                    let _ = stream.write_all(json.as_bytes()).await;
                    let _ = stream.write_all(b"\n").await;
                }
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(report.clone());
            }
        }
        Ok(())
    }
}

/// Log the global statistics the way the cloud tier's operator reads them.
pub fn log_report(report: &StatsReport) {
    tracing::info!(
        total_readings = report.total_readings,
        readings_per_sec = format_args!("{:.2}", report.readings_per_sec),
        mean = format_args!("{:.2}", report.mean),
        stddev = format_args!("{:.2}", report.stddev),
        min = format_args!("{:.2}", report.min),
        max = format_args!("{:.2}", report.max),
        relays = report.relay_count(),
        alerts = report.alerts_total,
        "global statistics"
    );
    tracing::info!(
        samples = report.latency.samples,
        mean_ms = format_args!("{:.2}", report.latency.mean_ms),
        p95_ms = report.latency.p95.as_millis(),
        p99_ms = report.latency.p99.as_millis(),
        "delivery latency"
    );
    for (relay, count) in &report.relays {
        tracing::info!(relay = %relay, readings = count, "relay tally");
    }
}
