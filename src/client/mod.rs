//! Telemetry client seam and client resolution.
//!
//! The engine talks to its backend only through [`TelemetryClient`]. Clients
//! are built by a [`ClientFactory`] from a connection string, which
//! [`resolve_client`] picks from the caller's [`ClientConfig`] or the
//! environment.

mod async_wrapper;
pub mod connection_string;
pub mod ingestion;

pub use async_wrapper::flush_blocking;
pub use connection_string::ConnectionString;
pub use ingestion::{IngestionClient, IngestionClientFactory, IngestionSettings};

use crate::config::{env_connection_string, ClientConfig, TransportOptions};
use crate::error::{ConfigError, ConfigResult, TelemetryResult};
use crate::models::Metric;
use std::sync::Arc;

/// Capability surface of a telemetry backend client.
pub trait TelemetryClient: Send + Sync {
    /// Record one metric. Delivery failures are the client's concern.
    fn track_metric(&self, metric: Metric);

    /// Push any buffered telemetry to the backend.
    fn flush(&self) -> TelemetryResult<()>;

    /// Apply transport options to a freshly constructed client.
    fn apply_options(&mut self, _options: &TransportOptions) {}
}

/// Builds telemetry clients from a connection string.
pub trait ClientFactory: Send + Sync {
    fn create(&self, connection_string: &str) -> ConfigResult<Box<dyn TelemetryClient>>;
}

/// Where the connection string used for a client came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Environment,
}

/// Pick the connection string: non-blank config value first, then the
/// environment.
pub fn resolve_connection_string(
    config: Option<&ClientConfig>,
) -> ConfigResult<(String, CredentialSource)> {
    if let Some(connection_string) = config.and_then(ClientConfig::connection_string) {
        return Ok((connection_string.to_string(), CredentialSource::Config));
    }

    env_connection_string()
        .map(|connection_string| (connection_string, CredentialSource::Environment))
        .ok_or(ConfigError::MissingConnectionString)
}

/// Construct and configure a new client.
///
/// Transport options from `config` are applied before the client is frozen
/// behind an `Arc`; the connection string itself is never passed as an option.
pub fn resolve_client(
    factory: &dyn ClientFactory,
    config: Option<&ClientConfig>,
) -> ConfigResult<Arc<dyn TelemetryClient>> {
    let (connection_string, source) = resolve_connection_string(config)?;
    tracing::debug!(source = ?source, "Resolved telemetry connection string");

    let mut client = factory.create(&connection_string)?;
    if let Some(config) = config {
        if !config.transport.is_empty() {
            client.apply_options(&config.transport);
        }
    }

    tracing::info!(source = ?source, "Telemetry client created");
    Ok(Arc::from(client))
}
