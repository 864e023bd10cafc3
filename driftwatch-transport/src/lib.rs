//! # driftwatch-transport
//!
//! Delivery-substrate adapter for the driftwatch telemetry pipeline.
//!
//! The statistics engine never touches a socket; this crate carries its
//! messages over NATS subjects and hands back typed streams. Delivery
//! semantics (at-most-once vs at-least-once, durable replay) belong to the
//! substrate — the pipeline assumes best effort and tolerates loss.
//!
//! Malformed inbound payloads are skipped with a warning, never fatal; the
//! shared filtered channel is decoded with a structural fallback for
//! untagged legacy payloads (see [`codec`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use driftwatch_transport::NatsTransport;
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = NatsTransport::builder()
//!         .url("nats://localhost:4222")
//!         .build()
//!         .await?;
//!
//!     let mut readings = transport.readings().await?;
//!     while let Some(reading) = readings.next().await {
//!         println!("{}: {:.2}", reading.source_id, reading.value);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod codec;
mod error;
mod nats;

pub use error::TransportError;
pub use nats::{NatsTransport, NatsTransportBuilder};

/// NATS subject carrying raw sensor readings.
pub const RAW_READINGS: &str = "sensors.readings";

/// NATS subject shared by forwarded readings and relay aggregates.
pub const FILTERED: &str = "edge.filtered";

/// NATS subject carrying alerts.
pub const ALERTS: &str = "edge.alerts";

/// NATS subject serving on-demand statistics reports (request/reply).
pub const STATS_QUERY: &str = "cloud.stats";
