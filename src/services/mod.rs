//! Measurement engine.
//!
//! The service layer wraps units of work with timing and reporting and
//! implements the two batch join policies.

mod batch;
mod metrics_service;

pub use metrics_service::MetricsService;
