//! # driftwatch-types
//!
//! Wire and data model types for the driftwatch telemetry pipeline. This
//! crate defines the messages that flow between the three tiers — sensors,
//! edge relays, and the cloud aggregator — plus the composite statistics
//! report the cloud tier emits.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: core types work without any
//!   serialization framework
//! - **Optional serialization**: enable the `serde` feature when messages
//!   cross a process boundary
//! - **Transport agnostic**: nothing here assumes NATS, Kafka, or any other
//!   delivery substrate
//! - **Versioned reports**: `StatsReport` embeds a schema version so
//!   consumers can handle format evolution
//!
//! ## Features
//!
//! - `std` (default): standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use driftwatch_types::{Millis, Reading, Envelope, FilteredReading};
//!
//! let reading = Reading {
//!     source_id: "sensor-a1".into(),
//!     value: 51.3,
//!     produced_at: Millis(1_703_160_000_000),
//! };
//!
//! // An edge relay stamps its identity on accepted readings.
//! let filtered = reading.forwarded_by("edge-1");
//! assert_eq!(filtered.relay_id, "edge-1");
//!
//! // The shared "filtered" channel carries two shapes behind one envelope.
//! let msg = Envelope::Reading(filtered);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod message;
mod millis;
mod report;

pub use message::*;
pub use millis::*;
pub use report::*;

/// Current report schema version.
///
/// Increment when making breaking changes to the `StatsReport` format.
pub const SCHEMA_VERSION: u32 = 1;

/// Schema version embedded in serialized reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SchemaVersion(pub u32);

impl SchemaVersion {
    /// The version this library writes.
    pub const fn current() -> Self {
        Self(SCHEMA_VERSION)
    }

    /// Whether a received report can be interpreted by this library.
    pub fn is_compatible(&self) -> bool {
        self.0 == SCHEMA_VERSION
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}
