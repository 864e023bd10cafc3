//! Messages exchanged between the pipeline tiers.
//!
//! Sensors publish [`Reading`]s; an edge relay that accepts a reading
//! forwards it as a [`FilteredReading`] and may raise an [`Alert`]; every
//! aggregation interval the relay also emits an [`AggregateSummary`]. The
//! filtered channel carries both forwarded readings and summaries, so they
//! travel inside a kind-tagged [`Envelope`].

use alloc::string::String;

use crate::Millis;

/// A single raw sensor observation.
///
/// Immutable once created; produced by a signal generator, consumed by the
/// edge tier's noise filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Identity of the producing sensor.
    pub source_id: String,
    /// Observed scalar value.
    pub value: f64,
    /// Unix-epoch milliseconds at production time.
    pub produced_at: Millis,
}

impl Reading {
    /// Stamp a relay identity on this reading, producing the shape the
    /// edge tier forwards to the cloud.
    pub fn forwarded_by(self, relay_id: impl Into<String>) -> FilteredReading {
        FilteredReading {
            source_id: self.source_id,
            value: self.value,
            produced_at: self.produced_at,
            relay_id: relay_id.into(),
        }
    }
}

/// A reading that passed an edge relay's noise filter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilteredReading {
    pub source_id: String,
    pub value: f64,
    pub produced_at: Millis,
    /// Identity of the edge relay that forwarded this reading.
    pub relay_id: String,
}

/// Classification of a threshold or deviation violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlertClass {
    /// Value outside the critical band of a tiered policy.
    Critical,
    /// Value outside the warning band of a tiered policy.
    Warning,
    /// Value below a static minimum bound.
    ThresholdLow,
    /// Value above a static maximum bound.
    ThresholdHigh,
}

impl AlertClass {
    /// Short label used in log lines and report keys.
    pub fn label(&self) -> &'static str {
        match self {
            AlertClass::Critical => "critical",
            AlertClass::Warning => "warning",
            AlertClass::ThresholdLow => "threshold_low",
            AlertClass::ThresholdHigh => "threshold_high",
        }
    }
}

/// A violation raised by an edge relay for one reading.
///
/// Created at most once per violating reading; never mutated afterwards.
/// The cloud tier retains alerts in a capped FIFO.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alert {
    pub source_id: String,
    pub value: f64,
    pub produced_at: Millis,
    pub relay_id: String,
    pub class: AlertClass,
    /// Human-readable description of the violation.
    pub message: String,
}

/// Periodic aggregate emitted by an edge relay.
///
/// Covers the readings accepted since the relay's previous drain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateSummary {
    pub relay_id: String,
    /// Number of readings covered by this summary.
    pub count: u64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Unix-epoch milliseconds at emission time.
    pub emitted_at: Millis,
}

/// Message envelope for the shared filtered channel.
///
/// Forwarded readings and aggregate summaries share one channel; the `kind`
/// tag discriminates them explicitly rather than by field-shape sniffing,
/// which silently misclassifies once field sets overlap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Envelope {
    /// A forwarded, filter-accepted reading.
    Reading(FilteredReading),
    /// A periodic per-relay aggregate.
    Summary(AggregateSummary),
}
