//! Observability module: timing and metric construction.
//!
//! This module provides the monotonic timer, the pure metric builder and the
//! scoped measurement that records exactly one metric per unit of work.

pub mod builder;
pub mod measurement;
pub mod timer;

pub use builder::{build_metric, error_message};
pub use measurement::{measure, measure_async, Measurement};
pub use timer::Timer;
