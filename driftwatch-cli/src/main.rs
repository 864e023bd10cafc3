//! driftwatch — a three-tier telemetry pipeline over NATS.
//!
//! One binary, three roles: `sensor` publishes a synthetic noisy signal,
//! `edge` filters and aggregates it locally, `cloud` fans relays in and
//! reports global statistics. Run one NATS server and as many of each tier
//! as you like.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cloud;
mod duration;
mod edge;
mod sensor;

#[derive(Parser, Debug)]
#[command(name = "driftwatch")]
#[command(about = "Three-tier telemetry pipeline: synthetic sensors, edge filtering, cloud statistics")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a synthetic sensor publishing raw readings
    Sensor(sensor::SensorArgs),
    /// Run an edge relay: noise filtering, alerts, periodic aggregates
    Edge(edge::EdgeArgs),
    /// Run the cloud aggregator: global statistics and reports
    Cloud(cloud::CloudArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Sensor(args) => sensor::run(args).await,
        Command::Edge(args) => edge::run(args).await,
        Command::Cloud(args) => cloud::run(args).await,
    }
}
