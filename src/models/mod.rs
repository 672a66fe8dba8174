//! Data models for measurements.
//!
//! This module contains the metric records reported to the telemetry backend
//! and the outcome structures returned to callers of the executors.

pub mod metric;
pub mod outcome;

pub use metric::{Metric, MetricRequest, Properties, DID_ERROR_KEY, ERROR_MESSAGE_KEY};
pub use outcome::{BatchOutcome, FailFastOutcome, Measured};
