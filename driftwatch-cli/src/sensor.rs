//! The sensor tier: publish a synthetic signal on a fixed interval.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use driftwatch_engine::{SignalConfig, SignalGenerator};
use driftwatch_transport::NatsTransport;
use driftwatch_types::{Millis, Reading};

use crate::duration::parse_duration;

#[derive(Args, Debug)]
pub struct SensorArgs {
    /// Sensor ID (auto-generated if empty)
    #[arg(short, long)]
    id: Option<String>,

    /// NATS server URL
    #[arg(long, default_value = "nats://localhost:4222")]
    nats: String,

    /// Publication interval (e.g. "1s", "250ms")
    #[arg(long, default_value = "1s")]
    interval: String,

    /// Base value for readings
    #[arg(long, default_value_t = 50.0)]
    base: f64,

    /// Noise level (standard deviation)
    #[arg(long, default_value_t = 2.0)]
    noise: f64,

    /// Probability of starting a drift episode per tick (0-1)
    #[arg(long, default_value_t = 0.05)]
    drift_chance: f64,

    /// Probability of a one-tick spike (0-1)
    #[arg(long, default_value_t = 0.02)]
    spike_chance: f64,

    /// RNG seed for a reproducible signal (entropy-seeded if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

pub async fn run(args: SensorArgs) -> Result<()> {
    let sensor_id = args
        .id
        .unwrap_or_else(|| format!("sensor-{}", &uuid::Uuid::new_v4().to_string()[..8]));
    let interval = parse_duration(&args.interval)?;

    let config = SignalConfig {
        base: args.base,
        noise_stddev: args.noise,
        drift_chance: args.drift_chance,
        spike_chance: args.spike_chance,
        ..SignalConfig::default()
    };
    let mut generator = match args.seed {
        Some(seed) => SignalGenerator::seeded(config, seed),
        None => SignalGenerator::from_entropy(config),
    };

    let transport = NatsTransport::builder().url(&args.nats).build().await?;
    info!(sensor_id = %sensor_id, interval = ?interval, "sensor started");

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reading = Reading {
                    source_id: sensor_id.clone(),
                    value: generator.next_value(),
                    produced_at: Millis::now(),
                };
                if let Err(err) = transport.publish_reading(&reading).await {
                    // Dropped; retries are the substrate's business.
                    warn!(error = %err, "failed to publish reading");
                    continue;
                }
                tracing::debug!(value = format_args!("{:.2}", reading.value), "published reading");
            }
            _ = tokio::signal::ctrl_c() => {
                info!(sensor_id = %sensor_id, "sensor shutting down");
                return Ok(());
            }
        }
    }
}
