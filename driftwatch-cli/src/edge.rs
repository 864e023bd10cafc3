//! The edge tier: filter readings, raise alerts, emit periodic aggregates.

use anyhow::Result;
use clap::{Args, ValueEnum};
use futures_util::StreamExt;
use tracing::{info, warn};

use driftwatch_engine::{AlertPolicy, Band, EdgeAggregator, EdgeConfig, IngestOutcome};
use driftwatch_transport::NatsTransport;

use crate::duration::parse_duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Static min/max threshold breaches
    Static,
    /// Tiered critical/warning deviation bands
    Tiered,
}

#[derive(Args, Debug)]
pub struct EdgeArgs {
    /// Edge relay ID (auto-generated if empty)
    #[arg(short, long)]
    id: Option<String>,

    /// NATS server URL
    #[arg(long, default_value = "nats://localhost:4222")]
    nats: String,

    /// Sliding window size for noise filtering
    #[arg(long, default_value_t = 10)]
    window: usize,

    /// Noise filter threshold (standard deviations)
    #[arg(long, default_value_t = 3.0)]
    noise_threshold: f64,

    /// Alert policy
    #[arg(long, value_enum, default_value_t = PolicyKind::Tiered)]
    policy: PolicyKind,

    /// Minimum threshold (static policy)
    #[arg(long, default_value_t = 30.0)]
    min: f64,

    /// Maximum threshold (static policy)
    #[arg(long, default_value_t = 80.0)]
    max: f64,

    /// Lower critical bound (tiered policy)
    #[arg(long, default_value_t = 0.0)]
    critical_low: f64,

    /// Upper critical bound (tiered policy)
    #[arg(long, default_value_t = 100.0)]
    critical_high: f64,

    /// Lower warning bound (tiered policy)
    #[arg(long, default_value_t = 40.0)]
    warn_low: f64,

    /// Upper warning bound (tiered policy)
    #[arg(long, default_value_t = 60.0)]
    warn_high: f64,

    /// Aggregation interval (e.g. "5s")
    #[arg(long, default_value = "5s")]
    aggregate_interval: String,
}

impl EdgeArgs {
    fn policy(&self) -> AlertPolicy {
        match self.policy {
            PolicyKind::Static => AlertPolicy::Static {
                min: self.min,
                max: self.max,
            },
            PolicyKind::Tiered => AlertPolicy::Tiered {
                critical: Band::new(self.critical_low, self.critical_high),
                warning: Band::new(self.warn_low, self.warn_high),
            },
        }
    }
}

pub async fn run(args: EdgeArgs) -> Result<()> {
    let relay_id = args.id.clone().unwrap_or_else(|| {
        format!(
            "edge-{}",
            driftwatch_types::Millis::now().as_millis()
        )
    });
    let aggregate_interval = parse_duration(&args.aggregate_interval)?;

    let config = EdgeConfig {
        window_capacity: args.window,
        noise_threshold: args.noise_threshold,
        policy: args.policy(),
    };
    let edge = EdgeAggregator::new(relay_id.clone(), config);

    let transport = NatsTransport::builder().url(&args.nats).build().await?;
    let mut readings = transport.readings().await?;
    info!(relay_id = %relay_id, interval = ?aggregate_interval, "edge relay started");

    let mut ticker = tokio::time::interval(aggregate_interval);
    loop {
        tokio::select! {
            maybe_reading = readings.next() => {
                let Some(reading) = maybe_reading else {
                    warn!("readings subscription closed");
                    return Ok(());
                };
                match edge.ingest(reading) {
                    IngestOutcome::Accepted { filtered, alert } => {
                        if let Err(err) = transport.publish_filtered(filtered).await {
                            warn!(error = %err, "failed to publish filtered reading");
                        }
                        if let Some(alert) = alert {
                            if let Err(err) = transport.publish_alert(&alert).await {
                                warn!(error = %err, "failed to publish alert");
                            }
                        }
                    }
                    IngestOutcome::Rejected { .. } => {
                        // Already logged by the engine; nothing is forwarded.
                    }
                }
            }
            _ = ticker.tick() => {
                if let Some(summary) = edge.drain() {
                    info!(
                        count = summary.count,
                        mean = format_args!("{:.2}", summary.mean),
                        min = format_args!("{:.2}", summary.min),
                        max = format_args!("{:.2}", summary.max),
                        "aggregate emitted"
                    );
                    if let Err(err) = transport.publish_summary(summary).await {
                        warn!(error = %err, "failed to publish aggregate");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!(relay_id = %relay_id, "edge relay shutting down");
                return Ok(());
            }
        }
    }
}
