//! Async bridge for the synchronous telemetry client surface.
//!
//! Flushing may perform blocking HTTP I/O, so async callers run it via
//! `tokio::task::spawn_blocking` to avoid blocking the async runtime.

use super::TelemetryClient;
use crate::error::{TelemetryError, TelemetryResult};
use std::sync::Arc;

/// Flush a client on tokio's blocking thread pool.
pub async fn flush_blocking(client: Arc<dyn TelemetryClient>) -> TelemetryResult<()> {
    tokio::task::spawn_blocking(move || client.flush())
        .await
        .map_err(|e| TelemetryError::TaskJoin(e.to_string()))?
}
