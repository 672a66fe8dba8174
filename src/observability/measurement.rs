//! Scoped measurement of a single unit of work.
//!
//! A [`Measurement`] is armed when its timer starts and records exactly one
//! metric: on [`Measurement::finish`] for units that return, on
//! [`Measurement::abandon`] for units that panic, or on drop for futures that
//! are dropped before they settle.

use crate::client::TelemetryClient;
use crate::models::{Measured, MetricRequest};
use crate::observability::builder::{build_metric, error_message};
use crate::observability::timer::Timer;
use futures::FutureExt;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Recorded when the unit of work panicked.
pub const PANICKED_MESSAGE: &str = "unit of work panicked";

/// Recorded when an in-flight unit of work was dropped.
pub const CANCELLED_MESSAGE: &str = "unit of work was cancelled before completion";

/// An armed stopwatch bound to the client that will receive its metric.
pub struct Measurement {
    timer: Timer,
    request: Arc<MetricRequest>,
    client: Arc<dyn TelemetryClient>,
    armed: bool,
}

impl Measurement {
    /// Start timing a unit of work.
    pub fn begin(client: Arc<dyn TelemetryClient>, request: Arc<MetricRequest>) -> Self {
        Self {
            timer: Timer::start(),
            request,
            client,
            armed: true,
        }
    }

    /// Stop the timer, record the metric and hand the outcome back.
    pub fn finish<T, E>(mut self, outcome: Result<T, E>) -> Result<Measured<T>, E>
    where
        E: Display + Debug,
    {
        let duration = self.timer.elapsed_seconds();
        self.armed = false;

        match outcome {
            Ok(result) => {
                self.record(duration, None);
                Ok(Measured { result, duration })
            }
            Err(err) => {
                let message = error_message(&err);
                tracing::warn!(
                    metric = %self.request.name,
                    duration_s = duration,
                    error = %message,
                    "Unit of work failed"
                );
                self.record(duration, Some(&message));
                Err(err)
            }
        }
    }

    /// Stop the timer and record a failure that produced no outcome.
    pub fn abandon(mut self, reason: &str) {
        self.armed = false;
        self.record(self.timer.elapsed_seconds(), Some(reason));
    }

    fn record(&self, duration: f64, error: Option<&str>) {
        let metric = build_metric(&self.request, duration, error);

        tracing::debug!(
            metric = %metric.name,
            duration_s = duration,
            did_error = error.is_some(),
            "Recording metric"
        );

        self.client.track_metric(metric);
    }
}

impl Drop for Measurement {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let reason = if std::thread::panicking() {
            PANICKED_MESSAGE
        } else {
            CANCELLED_MESSAGE
        };
        self.record(self.timer.elapsed_seconds(), Some(reason));
    }
}

/// Run a synchronous unit under a measurement.
pub fn measure<T, E, F>(
    client: Arc<dyn TelemetryClient>,
    request: Arc<MetricRequest>,
    unit: F,
) -> Result<Measured<T>, E>
where
    F: FnOnce() -> Result<T, E>,
    E: Display + Debug,
{
    let measurement = Measurement::begin(client, request);
    match panic::catch_unwind(AssertUnwindSafe(unit)) {
        Ok(outcome) => measurement.finish(outcome),
        Err(payload) => {
            measurement.abandon(PANICKED_MESSAGE);
            panic::resume_unwind(payload)
        }
    }
}

/// Run an asynchronous unit under a measurement.
///
/// The timer starts before the unit is invoked, so time spent constructing the
/// future counts toward the duration. Panics are caught here rather than left
/// to the guard, since an executor drops a panicked future only after unwinding.
pub async fn measure_async<T, E, F, Fut>(
    client: Arc<dyn TelemetryClient>,
    request: Arc<MetricRequest>,
    unit: F,
) -> Result<Measured<T>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + Debug,
{
    let measurement = Measurement::begin(client, request);
    match AssertUnwindSafe(async move { unit().await })
        .catch_unwind()
        .await
    {
        Ok(outcome) => measurement.finish(outcome),
        Err(payload) => {
            measurement.abandon(PANICKED_MESSAGE);
            panic::resume_unwind(payload)
        }
    }
}
