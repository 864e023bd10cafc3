//! Error types for the transport adapter.

use thiserror::Error;

/// Errors that can occur when moving messages over the delivery substrate.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the substrate failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Publishing a message failed.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// Subscribing to a subject failed.
    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    /// An inbound payload could not be decoded under any known shape.
    #[error("Failed to decode payload: {0}")]
    Decode(String),

    /// An outbound message could not be serialized.
    #[error("Failed to encode message: {0}")]
    Encode(String),
}
