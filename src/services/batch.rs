//! Join policies for batches of measured async units.

use crate::client::TelemetryClient;
use crate::error::ExecuteError;
use crate::models::{BatchOutcome, FailFastOutcome, Measured, MetricRequest};
use crate::observability::measure_async;
use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Run every unit to completion and collect each outcome in submission order.
///
/// Units are interleaved on the caller's task; none is spawned.
pub(crate) async fn join_settled<T, E, F, Fut, I>(
    client: Arc<dyn TelemetryClient>,
    request: Arc<MetricRequest>,
    units: I,
) -> BatchOutcome<T, E>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + Debug,
{
    let measured = units
        .into_iter()
        .map(|unit| measure_async(client.clone(), request.clone(), unit));

    let settled = join_all(measured).await;

    let mut outcome = BatchOutcome::with_capacity(settled.len());
    for result in settled {
        outcome.push(result);
    }
    outcome
}

/// Run every unit and return as soon as one fails.
///
/// Each unit is spawned onto the runtime. When one fails, the handles of the
/// others are dropped, which detaches them: they keep running and still
/// record their metrics, but no longer affect the caller.
pub(crate) async fn join_fail_fast<T, E, F, Fut, I>(
    client: Arc<dyn TelemetryClient>,
    request: Arc<MetricRequest>,
    units: I,
) -> Result<FailFastOutcome<T>, ExecuteError<E>>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Debug + Send + 'static,
{
    let handles: Vec<JoinHandle<Result<Measured<T>, E>>> = units
        .into_iter()
        .map(|unit| tokio::spawn(measure_async(client.clone(), request.clone(), unit)))
        .collect();

    let mut slots: Vec<Option<Measured<T>>> = handles.iter().map(|_| None).collect();
    let mut pending: FuturesUnordered<_> = handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| async move { (index, settle(handle).await) })
        .collect();

    while let Some((index, settled)) = pending.next().await {
        match settled {
            Ok(measured) => slots[index] = Some(measured),
            Err(err) => {
                tracing::debug!(
                    index,
                    in_flight = pending.len(),
                    "Fail-fast batch aborted, detaching remaining units"
                );
                return Err(err);
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

async fn settle<T, E>(
    handle: JoinHandle<Result<Measured<T>, E>>,
) -> Result<Measured<T>, ExecuteError<E>> {
    match handle.await {
        Ok(result) => result.map_err(ExecuteError::Execution),
        Err(join_error) if join_error.is_panic() => {
            std::panic::resume_unwind(join_error.into_panic())
        }
        Err(join_error) => Err(ExecuteError::TaskAborted(join_error.to_string())),
    }
}
