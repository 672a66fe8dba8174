//! The measurement engine.
//!
//! [`MetricsService`] times units of work and reports one metric per unit to
//! its telemetry client, resolving that client lazily on first use.

use super::batch::{join_fail_fast, join_settled};
use crate::client::{
    flush_blocking, resolve_client, ClientFactory, IngestionClientFactory, TelemetryClient,
};
use crate::config::ClientConfig;
use crate::error::{ConfigResult, ExecuteError, TelemetryError, TelemetryResult};
use crate::models::{BatchOutcome, FailFastOutcome, Measured, MetricRequest};
use crate::observability::{measure, measure_async};
use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::Arc;

/// Times units of work and reports them as telemetry metrics.
///
/// A service holds at most one client. It is either bound at construction
/// ([`MetricsService::with_client`]) or built on the first executor call from
/// that call's [`ClientConfig`]; later configs are ignored once a client
/// exists.
///
/// ```no_run
/// use telemetry_metrics::{ClientConfig, MetricRequest, MetricsService};
///
/// let mut service = MetricsService::new();
/// let config = ClientConfig::new().with_option("samplingPercentage", 100);
/// let metric = MetricRequest::new("sampleMetric").with_property("sampleDimension", "value");
///
/// let measured = service
///     .execute(|| Ok::<_, std::io::Error>("A value"), &metric, Some(&config))
///     .unwrap();
/// println!("Took {} seconds for {}", measured.duration, measured.result);
/// ```
pub struct MetricsService {
    client: Option<Arc<dyn TelemetryClient>>,
    factory: Arc<dyn ClientFactory>,
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsService {
    /// Create a service that builds an ingestion client on first use.
    pub fn new() -> Self {
        Self::with_factory(IngestionClientFactory)
    }

    /// Create a service that builds its client with a custom factory.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: ClientFactory + 'static,
    {
        Self {
            client: None,
            factory: Arc::new(factory),
        }
    }

    /// Create a service bound to an existing client; resolution is skipped.
    pub fn with_client<C>(client: C) -> Self
    where
        C: TelemetryClient + 'static,
    {
        Self::with_shared_client(Arc::new(client))
    }

    /// Create a service bound to a client that is also used elsewhere.
    pub fn with_shared_client(client: Arc<dyn TelemetryClient>) -> Self {
        Self {
            client: Some(client),
            factory: Arc::new(IngestionClientFactory),
        }
    }

    /// The resolved client, if any.
    pub fn client(&self) -> Option<&Arc<dyn TelemetryClient>> {
        self.client.as_ref()
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Return the held client, constructing it from `config` if none exists yet.
    ///
    /// Idempotent: once a client is held, `config` is ignored.
    pub fn ensure_client(
        &mut self,
        config: Option<&ClientConfig>,
    ) -> ConfigResult<Arc<dyn TelemetryClient>> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }

        let client = resolve_client(self.factory.as_ref(), config)?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Time a synchronous unit of work.
    ///
    /// The metric is recorded before the result or error is returned. A
    /// configuration failure happens before the unit is invoked.
    pub fn execute<T, E, F>(
        &mut self,
        unit: F,
        metric: &MetricRequest,
        config: Option<&ClientConfig>,
    ) -> Result<Measured<T>, ExecuteError<E>>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display + Debug,
    {
        let client = self.ensure_client(config)?;
        measure(client, Arc::new(metric.clone()), unit).map_err(ExecuteError::Execution)
    }

    /// Time an asynchronous unit of work.
    pub async fn execute_async<T, E, F, Fut>(
        &mut self,
        unit: F,
        metric: &MetricRequest,
        config: Option<&ClientConfig>,
    ) -> Result<Measured<T>, ExecuteError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display + Debug,
    {
        let client = self.ensure_client(config)?;
        measure_async(client, Arc::new(metric.clone()), unit)
            .await
            .map_err(ExecuteError::Execution)
    }

    /// Time a batch of asynchronous units, waiting for every one to settle.
    ///
    /// Each unit records its own metric. Unit failures never fail the call;
    /// they are reported in [`BatchOutcome::errors`] at the unit's index.
    pub async fn execute_all_async<T, E, F, Fut, I>(
        &mut self,
        units: I,
        metric: &MetricRequest,
        config: Option<&ClientConfig>,
    ) -> ConfigResult<BatchOutcome<T, E>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display + Debug,
    {
        let client = self.ensure_client(config)?;
        let outcome = join_settled(client, Arc::new(metric.clone()), units).await;

        tracing::debug!(
            metric = %metric.name,
            units = outcome.len(),
            failed = outcome.error_count(),
            "Batch settled"
        );
        Ok(outcome)
    }

    /// Time a batch of asynchronous units, failing on the first unit error.
    ///
    /// Units run as spawned tokio tasks. The first error to occur in time is
    /// returned; units still in flight are not cancelled and record their
    /// metrics when they finish.
    pub async fn execute_all_fail_fast_async<T, E, F, Fut, I>(
        &mut self,
        units: I,
        metric: &MetricRequest,
        config: Option<&ClientConfig>,
    ) -> Result<FailFastOutcome<T>, ExecuteError<E>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Debug + Send + 'static,
    {
        let client = self.ensure_client(config)?;
        join_fail_fast(client, Arc::new(metric.clone()), units).await
    }

    /// Flush the held client.
    ///
    /// Fails with [`TelemetryError::ClientNotInitialized`] if no client has
    /// been resolved yet.
    pub fn flush_client(&self) -> TelemetryResult<()> {
        let client = self
            .client
            .as_ref()
            .ok_or(TelemetryError::ClientNotInitialized)?;
        client.flush()
    }

    /// Flush the held client on the blocking thread pool.
    pub async fn flush_client_async(&self) -> TelemetryResult<()> {
        let client = self
            .client
            .clone()
            .ok_or(TelemetryError::ClientNotInitialized)?;
        flush_blocking(client).await
    }
}
