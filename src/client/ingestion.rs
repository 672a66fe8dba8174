//! HTTP telemetry client for an Application Insights style ingestion endpoint.
//!
//! Metrics are buffered in memory by [`TelemetryClient::track_metric`] and
//! sent as a single JSON array on [`TelemetryClient::flush`]. The client uses
//! `ureq` for synchronous requests; async callers go through
//! [`crate::client::flush_blocking`].

use super::connection_string::ConnectionString;
use super::{ClientFactory, TelemetryClient};
use crate::config::{
    TransportOptions, DISABLE_OPTION, ENDPOINT_URL_OPTION, REQUEST_TIMEOUT_OPTION,
    SAMPLING_PERCENTAGE_OPTION,
};
use crate::error::{ConfigResult, TelemetryError, TelemetryResult};
use crate::models::Metric;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// SDK identifier reported on every envelope.
const SDK_VERSION: &str = concat!("rust:telemetry-metrics:", env!("CARGO_PKG_VERSION"));

/// Transport settings of an [`IngestionClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionSettings {
    /// Sampling percentage reported to the backend (default: 100)
    pub sampling_percentage: f64,

    /// Discard instead of sending on flush (default: false)
    pub disabled: bool,

    /// HTTP timeout for flushes (default: 10 seconds)
    pub request_timeout: Duration,

    /// Base URL that envelopes are posted to
    pub endpoint_url: String,

    /// Options the client does not interpret, kept verbatim
    pub extra: TransportOptions,
}

impl IngestionSettings {
    fn for_connection(connection: &ConnectionString) -> Self {
        Self {
            sampling_percentage: 100.0,
            disabled: false,
            request_timeout: Duration::from_secs(10),
            endpoint_url: connection.ingestion_endpoint.clone(),
            extra: TransportOptions::new(),
        }
    }
}

/// Buffered HTTP client for the ingestion endpoint.
pub struct IngestionClient {
    connection: ConnectionString,
    settings: IngestionSettings,
    agent: ureq::Agent,
    buffer: Mutex<Vec<Value>>,
}

impl IngestionClient {
    /// Create a client from a raw connection string.
    pub fn new(connection_string: &str) -> ConfigResult<Self> {
        let connection = ConnectionString::parse(connection_string)?;
        Ok(Self::from_connection(connection))
    }

    /// Create a client from an already parsed connection string.
    pub fn from_connection(connection: ConnectionString) -> Self {
        let settings = IngestionSettings::for_connection(&connection);
        let agent = Self::build_agent(settings.request_timeout);

        Self {
            connection,
            settings,
            agent,
            buffer: Mutex::new(Vec::new()),
        }
    }

    fn build_agent(timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new().timeout(timeout).build()
    }

    /// Current transport settings.
    pub fn settings(&self) -> &IngestionSettings {
        &self.settings
    }

    /// The parsed connection string.
    pub fn connection(&self) -> &ConnectionString {
        &self.connection
    }

    /// Number of envelopes waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.lock_buffer().len()
    }

    fn lock_buffer(&self) -> MutexGuard<'_, Vec<Value>> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn track_url(&self) -> String {
        format!("{}/v2/track", self.settings.endpoint_url.trim_end_matches('/'))
    }

    fn envelope(&self, metric: &Metric) -> Value {
        let properties: serde_json::Map<String, Value> = metric
            .properties
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), Value::String(text))
            })
            .collect();

        json!({
            "name": format!(
                "Microsoft.ApplicationInsights.{}.Metric",
                self.connection.instrumentation_key.replace('-', "")
            ),
            "time": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "iKey": self.connection.instrumentation_key,
            "sampleRate": self.settings.sampling_percentage,
            "tags": { "ai.internal.sdkVersion": SDK_VERSION },
            "data": {
                "baseType": "MetricData",
                "baseData": {
                    "ver": 2,
                    "metrics": [{
                        "name": metric.name,
                        "value": metric.value,
                        "count": 1
                    }],
                    "properties": properties
                }
            }
        })
    }

    fn map_error(&self, error: ureq::Error) -> TelemetryError {
        match error {
            ureq::Error::Status(code, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                TelemetryError::Status {
                    status: code,
                    message,
                }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::Io {
                    TelemetryError::Timeout
                } else {
                    TelemetryError::Transport(transport.to_string())
                }
            }
        }
    }
}

impl TelemetryClient for IngestionClient {
    fn track_metric(&self, metric: Metric) {
        let envelope = self.envelope(&metric);
        self.lock_buffer().push(envelope);
    }

    fn flush(&self) -> TelemetryResult<()> {
        let batch = std::mem::take(&mut *self.lock_buffer());
        if batch.is_empty() {
            return Ok(());
        }

        if self.settings.disabled {
            tracing::debug!(count = batch.len(), "Telemetry disabled, discarding metrics");
            return Ok(());
        }

        let url = self.track_url();
        let count = batch.len();
        tracing::debug!("POST {} ({} envelopes)", url, count);

        match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(Value::Array(batch))
        {
            Ok(response) => {
                tracing::debug!("POST {} - Success (status: {})", url, response.status());
                Ok(())
            }
            Err(e) => {
                let err = self.map_error(e);
                tracing::error!("POST {} - Error: {:?}", url, err);
                Err(err)
            }
        }
    }

    fn apply_options(&mut self, options: &TransportOptions) {
        for (key, value) in options {
            let applied = match key.as_str() {
                SAMPLING_PERCENTAGE_OPTION => value
                    .as_f64()
                    .filter(|pct| (0.0..=100.0).contains(pct))
                    .map(|pct| self.settings.sampling_percentage = pct),
                DISABLE_OPTION => value
                    .as_bool()
                    .map(|disabled| self.settings.disabled = disabled),
                ENDPOINT_URL_OPTION => value
                    .as_str()
                    .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
                    .map(|url| self.settings.endpoint_url = url.trim_end_matches('/').to_string()),
                REQUEST_TIMEOUT_OPTION => value.as_u64().filter(|secs| *secs > 0).map(|secs| {
                    self.settings.request_timeout = Duration::from_secs(secs);
                    self.agent = Self::build_agent(self.settings.request_timeout);
                }),
                _ => {
                    self.settings.extra.insert(key.clone(), value.clone());
                    Some(())
                }
            };

            if applied.is_none() {
                tracing::warn!(option = %key, value = %value, "Ignoring invalid transport option");
            }
        }
    }
}

/// Factory producing [`IngestionClient`]s; the engine's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestionClientFactory;

impl ClientFactory for IngestionClientFactory {
    fn create(&self, connection_string: &str) -> ConfigResult<Box<dyn TelemetryClient>> {
        Ok(Box::new(IngestionClient::new(connection_string)?))
    }
}
