//! Error types for the telemetry metrics engine.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors that can occur while resolving the telemetry client configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No connection string in the supplied config nor in the environment
    #[error("No connection string found to create a new telemetry client.")]
    MissingConnectionString,

    /// Connection string could not be parsed
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// The client factory refused to build a client
    #[error("Failed to construct telemetry client: {0}")]
    ClientConstruction(String),
}

/// Errors raised by a telemetry client or by the engine's client handling.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Flush was requested before any client was resolved
    #[error("Telemetry client has not been initialized")]
    ClientNotInitialized,

    /// Ingestion endpoint returned an error status code
    #[error("Ingestion error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// HTTP transport failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Failed to serialize telemetry payload
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blocking flush task could not be joined
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

/// Errors returned by the measuring executors.
///
/// `E` is the error type of the measured unit of work. A unit failure is
/// always recorded as a metric before it surfaces as [`ExecuteError::Execution`].
#[derive(Error, Debug)]
pub enum ExecuteError<E> {
    /// Client resolution failed; the unit of work was never invoked
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The unit of work itself failed
    #[error("{0}")]
    Execution(E),

    /// A spawned unit was cancelled by the runtime before it settled
    #[error("Unit of work aborted: {0}")]
    TaskAborted(String),
}

impl<E> ExecuteError<E> {
    /// Whether this error came from the unit of work.
    pub fn is_execution(&self) -> bool {
        matches!(self, ExecuteError::Execution(_))
    }

    /// Unwrap the unit of work's own error, if that is what this is.
    pub fn into_execution(self) -> Option<E> {
        match self {
            ExecuteError::Execution(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with TelemetryError
pub type TelemetryResult<T> = Result<T, TelemetryError>;
