//! Configuration for telemetry client resolution.
//!
//! A [`ClientConfig`] carries an optional connection string plus free-form
//! transport options that are handed to the client once it is constructed.
//! When no connection string is supplied, the engine falls back to the
//! `APPLICATIONINSIGHTS_CONNECTION_STRING` environment variable, optionally
//! loaded from a `.env` file.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;

/// Environment variable holding the process-wide connection string.
pub const CONNECTION_STRING_ENV: &str = "APPLICATIONINSIGHTS_CONNECTION_STRING";

/// Transport option: percentage of telemetry the backend should keep (0-100).
pub const SAMPLING_PERCENTAGE_OPTION: &str = "samplingPercentage";

/// Transport option: discard telemetry on flush instead of sending it.
pub const DISABLE_OPTION: &str = "disableAppInsights";

/// Transport option: override the ingestion endpoint from the connection string.
pub const ENDPOINT_URL_OPTION: &str = "endpointUrl";

/// Transport option: HTTP timeout for flushes, in seconds.
pub const REQUEST_TIMEOUT_OPTION: &str = "requestTimeout";

/// Free-form transport settings applied to a freshly constructed client.
pub type TransportOptions = Map<String, Value>;

/// Caller-supplied telemetry client configuration.
///
/// Serializes with camelCase keys and the transport options flattened, so
/// `{"connectionString": "...", "samplingPercentage": 100}` round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Credential used to construct the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Everything else, passed through to the client
    #[serde(flatten)]
    pub transport: TransportOptions,
}

impl ClientConfig {
    /// Empty configuration; resolution will rely on the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connection string.
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    /// Add a transport option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.transport.insert(key.into(), value.into());
        self
    }

    /// The connection string, if present and not blank.
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `APPLICATIONINSIGHTS_CONNECTION_STRING`: connection string
    /// - `TELEMETRY_SAMPLING_PERCENTAGE`: sampling percentage (0-100)
    /// - `TELEMETRY_DISABLED`: `true`/`false`, discard telemetry on flush
    /// - `TELEMETRY_REQUEST_TIMEOUT`: flush timeout in seconds
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = ClientConfig {
            connection_string: env_connection_string(),
            transport: TransportOptions::new(),
        };

        if let Some(percentage) = Self::parse_env_u8("TELEMETRY_SAMPLING_PERCENTAGE")? {
            if percentage > 100 {
                return Err(ConfigError::InvalidValue {
                    var: "TELEMETRY_SAMPLING_PERCENTAGE".to_string(),
                    reason: "Must be between 0 and 100".to_string(),
                });
            }
            config
                .transport
                .insert(SAMPLING_PERCENTAGE_OPTION.to_string(), percentage.into());
        }

        if let Some(disabled) = Self::parse_env_bool("TELEMETRY_DISABLED")? {
            config
                .transport
                .insert(DISABLE_OPTION.to_string(), disabled.into());
        }

        if let Some(timeout) = Self::parse_env_u64("TELEMETRY_REQUEST_TIMEOUT")? {
            config
                .transport
                .insert(REQUEST_TIMEOUT_OPTION.to_string(), timeout.into());
        }

        Ok(config)
    }

    /// Parse an optional environment variable as u64.
    fn parse_env_u64(var_name: &str) -> ConfigResult<Option<u64>> {
        match env::var(var_name) {
            Ok(val) => val
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be a positive number, got: {}", val),
                }),
            Err(_) => Ok(None),
        }
    }

    /// Parse an optional environment variable as u8.
    fn parse_env_u8(var_name: &str) -> ConfigResult<Option<u8>> {
        match env::var(var_name) {
            Ok(val) => val
                .trim()
                .parse::<u8>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be a number between 0-255, got: {}", val),
                }),
            Err(_) => Ok(None),
        }
    }

    /// Parse an optional environment variable as bool.
    fn parse_env_bool(var_name: &str) -> ConfigResult<Option<bool>> {
        match env::var(var_name) {
            Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be true or false, got: {}", val),
                }),
            },
            Err(_) => Ok(None),
        }
    }
}

/// Read the process-wide connection string.
///
/// Loads a `.env` file if one exists (without failing when it doesn't) and
/// returns the variable only when it is set and not blank.
pub fn env_connection_string() -> Option<String> {
    // dotenvy::dotenv() never overrides variables that are already set
    let _ = dotenvy::dotenv();

    env::var(CONNECTION_STRING_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
