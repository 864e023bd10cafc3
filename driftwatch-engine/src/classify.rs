//! Threshold and tiered alert classification.

use driftwatch_types::{Alert, AlertClass, FilteredReading};

/// An inclusive value band; values strictly outside it violate the band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `value` lies strictly outside this band.
    pub fn violated_by(&self, value: f64) -> bool {
        value < self.low || value > self.high
    }
}

/// Alert classification policy for one deployed relay.
///
/// Exactly one policy is active per instance, selected by configuration.
/// Classification looks only at the value — it never consults a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertPolicy {
    /// Flag values below `min` or above `max` as threshold breaches.
    Static { min: f64, max: f64 },
    /// Two-level deviation policy. The critical band is checked first and
    /// takes precedence; the warning band is configured independently and
    /// need not nest inside it.
    Tiered { critical: Band, warning: Band },
}

impl AlertPolicy {
    /// Default static bounds for a signal hovering around 50 (30..80).
    pub fn default_static() -> Self {
        AlertPolicy::Static { min: 30.0, max: 80.0 }
    }

    /// Default tiered bounds: critical outside 0..100 (spikes), warning
    /// outside 40..60 (drift).
    pub fn default_tiered() -> Self {
        AlertPolicy::Tiered {
            critical: Band::new(0.0, 100.0),
            warning: Band::new(40.0, 60.0),
        }
    }

    /// Classify a value, returning `None` when it raises no alert.
    pub fn classify(&self, value: f64) -> Option<AlertClass> {
        match *self {
            AlertPolicy::Static { min, max } => {
                if value < min {
                    Some(AlertClass::ThresholdLow)
                } else if value > max {
                    Some(AlertClass::ThresholdHigh)
                } else {
                    None
                }
            }
            AlertPolicy::Tiered { critical, warning } => {
                if critical.violated_by(value) {
                    Some(AlertClass::Critical)
                } else if warning.violated_by(value) {
                    Some(AlertClass::Warning)
                } else {
                    None
                }
            }
        }
    }

    /// Build the alert for a forwarded reading, if its value violates this
    /// policy. At most one alert is ever raised per reading.
    pub fn alert(&self, reading: &FilteredReading) -> Option<Alert> {
        let class = self.classify(reading.value)?;
        Some(Alert {
            source_id: reading.source_id.clone(),
            value: reading.value,
            produced_at: reading.produced_at,
            relay_id: reading.relay_id.clone(),
            class,
            message: message_for(class).to_string(),
        })
    }
}

fn message_for(class: AlertClass) -> &'static str {
    match class {
        AlertClass::Critical => "critical value outside safe range (spike)",
        AlertClass::Warning => "process drift detected (warning)",
        AlertClass::ThresholdLow => "value below minimum threshold",
        AlertClass::ThresholdHigh => "value above maximum threshold",
    }
}
