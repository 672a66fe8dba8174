//! Telemetry Metrics - execution timing for units of work, reported as telemetry metrics.
//!
//! This library wraps synchronous functions, futures, and batches of futures,
//! measures how long each one takes on the monotonic clock, and records one
//! metric per unit with a fixed shape (`name`, `value` in seconds and
//! `properties` carrying `didError`/`errorMessage`), whether the unit succeeds,
//! fails or panics.
//!
//! # Architecture
//!
//! - **models**: Metric records, metric request templates and execution outcomes
//! - **error**: Custom error types for precise error handling
//! - **config**: Client configuration and environment credential lookup
//! - **client**: Telemetry client seam, client resolution and the HTTP ingestion client
//! - **observability**: Timer, metric builder and scoped measurement
//! - **services**: The measurement engine and its batch join policies

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;

pub use client::{ClientFactory, ConnectionString, IngestionClient, TelemetryClient};
pub use config::{ClientConfig, TransportOptions};
pub use error::{ConfigError, ExecuteError, TelemetryError};
pub use models::{BatchOutcome, FailFastOutcome, Measured, Metric, MetricRequest, Properties};
pub use observability::Timer;
pub use services::MetricsService;
