//! The cloud tier: fan relays in, report global statistics.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use futures_util::StreamExt;
use tracing::{info, warn};

use driftwatch_engine::{CloudAggregator, CloudConfig, Output, Reporter};
use driftwatch_transport::NatsTransport;
use driftwatch_types::Envelope;

use crate::duration::parse_duration;

#[derive(Args, Debug)]
pub struct CloudArgs {
    /// NATS server URL
    #[arg(long, default_value = "nats://localhost:4222")]
    nats: String,

    /// Statistics reporting interval (e.g. "10s")
    #[arg(long, default_value = "10s")]
    report_interval: String,

    /// Maximum readings to keep in the global window
    #[arg(long, default_value_t = 10_000)]
    max_readings: usize,

    /// Maximum alerts to retain
    #[arg(long, default_value_t = 1_000)]
    max_alerts: usize,

    /// Maximum latency samples to retain
    #[arg(long, default_value_t = 10_000)]
    max_latencies: usize,

    /// Also write each report to this JSON file
    #[arg(long)]
    report_file: Option<std::path::PathBuf>,

    /// Also send each report to this TCP endpoint (host:port)
    #[arg(long)]
    report_tcp: Option<String>,
}

pub async fn run(args: CloudArgs) -> Result<()> {
    let report_interval = parse_duration(&args.report_interval)?;

    let config = CloudConfig {
        max_readings: args.max_readings,
        max_alerts: args.max_alerts,
        max_latencies: args.max_latencies,
        ..CloudConfig::default()
    };
    let cloud = Arc::new(CloudAggregator::new(config));

    let transport = NatsTransport::builder().url(&args.nats).build().await?;
    let mut filtered = transport.filtered().await?;
    let mut alerts = transport.alerts().await?;
    let mut queries = transport.stats_queries().await?;
    info!(interval = ?report_interval, "cloud aggregator started");

    let mut reporter = Reporter::builder()
        .output(Output::Log)
        .interval(report_interval);
    if let Some(path) = args.report_file {
        reporter = reporter.output(Output::file(path));
    }
    if let Some(addr) = args.report_tcp {
        reporter = reporter.output(Output::tcp(addr));
    }
    let emission = reporter.build(cloud.clone()).start();

    loop {
        tokio::select! {
            maybe_envelope = filtered.next() => {
                let Some(envelope) = maybe_envelope else {
                    warn!("filtered subscription closed");
                    break;
                };
                match envelope {
                    Envelope::Reading(reading) => cloud.ingest_reading(&reading),
                    Envelope::Summary(summary) => cloud.ingest_summary(&summary),
                }
            }
            maybe_alert = alerts.next() => {
                let Some(alert) = maybe_alert else {
                    warn!("alerts subscription closed");
                    break;
                };
                cloud.ingest_alert(alert);
            }
            maybe_query = queries.next() => {
                let Some(query) = maybe_query else {
                    warn!("stats query subscription closed");
                    break;
                };
                let report = cloud.snapshot();
                if let Err(err) = transport.respond_with_report(&query, &report).await {
                    warn!(error = %err, "failed to answer stats query");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("cloud aggregator shutting down");
                break;
            }
        }
    }

    emission.stop();
    Ok(())
}
