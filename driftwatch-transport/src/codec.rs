//! JSON wire codec with structural fallback for the shared channel.

use driftwatch_types::{AggregateSummary, Alert, Envelope, FilteredReading, Reading, StatsReport};

use crate::TransportError;

/// Encode any message as JSON bytes.
pub fn encode<T: serde::Serialize>(message: &T) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(message).map_err(|e| TransportError::Encode(e.to_string()))
}

/// Decode a raw sensor reading.
pub fn decode_reading(payload: &[u8]) -> Result<Reading, TransportError> {
    serde_json::from_slice(payload).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Decode an alert.
pub fn decode_alert(payload: &[u8]) -> Result<Alert, TransportError> {
    serde_json::from_slice(payload).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Decode a statistics report.
pub fn decode_report(payload: &[u8]) -> Result<StatsReport, TransportError> {
    serde_json::from_slice(payload).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Decode a message from the shared filtered channel.
///
/// Everything this pipeline publishes there is a kind-tagged [`Envelope`],
/// tried first. Untagged legacy payloads fall back to interpretation by
/// structural shape — a forwarded reading, then a relay aggregate — before
/// the payload is given up on.
pub fn decode_filtered(payload: &[u8]) -> Result<Envelope, TransportError> {
    if let Ok(envelope) = serde_json::from_slice::<Envelope>(payload) {
        return Ok(envelope);
    }
    if let Ok(reading) = serde_json::from_slice::<FilteredReading>(payload) {
        return Ok(Envelope::Reading(reading));
    }
    match serde_json::from_slice::<AggregateSummary>(payload) {
        Ok(summary) => Ok(Envelope::Summary(summary)),
        Err(e) => Err(TransportError::Decode(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_types::Millis;

    fn sample_filtered() -> FilteredReading {
        FilteredReading {
            source_id: "sensor-1".to_string(),
            value: 51.5,
            produced_at: Millis(1000),
            relay_id: "edge-1".to_string(),
        }
    }

    #[test]
    fn envelope_roundtrip() {
        let envelope = Envelope::Reading(sample_filtered());
        let bytes = encode(&envelope).unwrap();
        let decoded = decode_filtered(&bytes).unwrap();
        assert_eq!(envelope, decoded);
    }

    #[test]
    fn untagged_reading_falls_back_structurally() {
        // A legacy publisher sends the bare reading with no kind tag.
        let bytes = encode(&sample_filtered()).unwrap();
        match decode_filtered(&bytes).unwrap() {
            Envelope::Reading(reading) => assert_eq!(reading.relay_id, "edge-1"),
            Envelope::Summary(_) => panic!("misclassified reading as summary"),
        }
    }

    #[test]
    fn untagged_summary_falls_back_structurally() {
        let summary = AggregateSummary {
            relay_id: "edge-2".to_string(),
            count: 9,
            mean: 50.0,
            min: 44.0,
            max: 56.0,
            emitted_at: Millis(2000),
        };
        let bytes = encode(&summary).unwrap();
        match decode_filtered(&bytes).unwrap() {
            Envelope::Summary(decoded) => assert_eq!(decoded, summary),
            Envelope::Reading(_) => panic!("misclassified summary as reading"),
        }
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let err = decode_filtered(b"not json at all").unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        // Valid JSON, but matches neither message shape.
        let err = decode_filtered(br#"{"foo": 1}"#).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn reading_decode_rejects_missing_fields() {
        let err = decode_reading(br#"{"source_id": "s1"}"#).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn alert_roundtrip() {
        let alert = Alert {
            source_id: "sensor-1".to_string(),
            value: 130.0,
            produced_at: Millis(1000),
            relay_id: "edge-1".to_string(),
            class: driftwatch_types::AlertClass::Critical,
            message: "critical value outside safe range (spike)".to_string(),
        };
        let bytes = encode(&alert).unwrap();
        assert_eq!(decode_alert(&bytes).unwrap(), alert);
    }
}
