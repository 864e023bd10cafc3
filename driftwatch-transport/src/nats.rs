//! NATS client for the pipeline's subjects.

use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use driftwatch_types::{AggregateSummary, Alert, Envelope, FilteredReading, Reading, StatsReport};

use crate::codec;
use crate::{TransportError, ALERTS, FILTERED, RAW_READINGS, STATS_QUERY};

/// NATS transport for publishing and subscribing to pipeline messages.
///
/// Publish methods are fire-and-forget against the substrate's delivery
/// guarantees; a failure is reported as an error for the caller to log and
/// drop — no retry queue exists at this layer. Subscription methods return
/// typed streams that skip malformed payloads with a warning.
pub struct NatsTransport {
    client: async_nats::Client,
}

impl NatsTransport {
    /// Create a new builder for configuring the transport.
    pub fn builder() -> NatsTransportBuilder {
        NatsTransportBuilder::default()
    }

    /// Publish a raw sensor reading.
    pub async fn publish_reading(&self, reading: &Reading) -> Result<(), TransportError> {
        self.publish(RAW_READINGS, codec::encode(reading)?).await
    }

    /// Publish a forwarded reading on the shared filtered channel.
    pub async fn publish_filtered(&self, reading: FilteredReading) -> Result<(), TransportError> {
        let envelope = Envelope::Reading(reading);
        self.publish(FILTERED, codec::encode(&envelope)?).await
    }

    /// Publish a relay aggregate on the shared filtered channel.
    pub async fn publish_summary(&self, summary: AggregateSummary) -> Result<(), TransportError> {
        let envelope = Envelope::Summary(summary);
        self.publish(FILTERED, codec::encode(&envelope)?).await
    }

    /// Publish an alert.
    pub async fn publish_alert(&self, alert: &Alert) -> Result<(), TransportError> {
        self.publish(ALERTS, codec::encode(alert)?).await
    }

    async fn publish(&self, subject: &'static str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.client
            .publish(subject, payload.into())
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))
    }

    /// Subscribe to raw sensor readings.
    pub async fn readings(&self) -> Result<BoxStream<'static, Reading>, TransportError> {
        let subscriber = self.subscribe(RAW_READINGS).await?;
        Ok(subscriber
            .filter_map(|msg| async move {
                match codec::decode_reading(&msg.payload) {
                    Ok(reading) => Some(reading),
                    Err(err) => {
                        tracing::warn!(subject = RAW_READINGS, error = %err, "skipping malformed message");
                        None
                    }
                }
            })
            .boxed())
    }

    /// Subscribe to the shared filtered channel.
    ///
    /// Yields both forwarded readings and relay aggregates; payloads that
    /// decode as neither are skipped.
    pub async fn filtered(&self) -> Result<BoxStream<'static, Envelope>, TransportError> {
        let subscriber = self.subscribe(FILTERED).await?;
        Ok(subscriber
            .filter_map(|msg| async move {
                match codec::decode_filtered(&msg.payload) {
                    Ok(envelope) => Some(envelope),
                    Err(err) => {
                        tracing::warn!(subject = FILTERED, error = %err, "skipping malformed message");
                        None
                    }
                }
            })
            .boxed())
    }

    /// Subscribe to alerts.
    pub async fn alerts(&self) -> Result<BoxStream<'static, Alert>, TransportError> {
        let subscriber = self.subscribe(ALERTS).await?;
        Ok(subscriber
            .filter_map(|msg| async move {
                match codec::decode_alert(&msg.payload) {
                    Ok(alert) => Some(alert),
                    Err(err) => {
                        tracing::warn!(subject = ALERTS, error = %err, "skipping malformed message");
                        None
                    }
                }
            })
            .boxed())
    }

    /// Subscribe to on-demand report queries.
    ///
    /// Each yielded message carries the requester's reply subject; answer
    /// with [`respond_with_report`](Self::respond_with_report).
    pub async fn stats_queries(
        &self,
    ) -> Result<BoxStream<'static, async_nats::Message>, TransportError> {
        Ok(self.subscribe(STATS_QUERY).await?.boxed())
    }

    /// Reply to an on-demand report query.
    pub async fn respond_with_report(
        &self,
        query: &async_nats::Message,
        report: &StatsReport,
    ) -> Result<(), TransportError> {
        let Some(reply) = query.reply.clone() else {
            // Fire-and-forget query with no reply subject; nothing to do.
            return Ok(());
        };
        self.client
            .publish(reply, codec::encode(report)?.into())
            .await
            .map_err(|e| TransportError::Publish(e.to_string()))
    }

    /// Request the current report from a running cloud tier.
    pub async fn query_report(&self) -> Result<StatsReport, TransportError> {
        let response = self
            .client
            .request(STATS_QUERY, "".into())
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        codec::decode_report(&response.payload)
    }

    async fn subscribe(
        &self,
        subject: &'static str,
    ) -> Result<async_nats::Subscriber, TransportError> {
        self.client
            .subscribe(subject)
            .await
            .map_err(|e| TransportError::Subscribe(e.to_string()))
    }
}

impl std::fmt::Debug for NatsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsTransport").finish()
    }
}

/// Builder for [`NatsTransport`].
#[derive(Debug, Default)]
pub struct NatsTransportBuilder {
    url: Option<String>,
    credentials: Option<String>,
}

impl NatsTransportBuilder {
    /// Set the NATS server URL (default: "nats://localhost:4222").
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the path to a credentials file for authentication.
    pub fn credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials = Some(path.into());
        self
    }

    /// Build the transport.
    pub async fn build(self) -> Result<NatsTransport, TransportError> {
        let url = self
            .url
            .unwrap_or_else(|| "nats://localhost:4222".to_string());

        let client = if let Some(creds) = self.credentials {
            async_nats::ConnectOptions::new()
                .credentials_file(&creds)
                .await
                .map_err(|e| TransportError::Auth(e.to_string()))?
                .connect(&url)
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?
        } else {
            async_nats::connect(&url)
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?
        };

        Ok(NatsTransport { client })
    }
}
