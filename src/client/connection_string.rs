//! Parsing of Application Insights style connection strings.
//!
//! Accepted forms:
//! - `InstrumentationKey=<guid>;IngestionEndpoint=<url>;LiveEndpoint=<url>`
//! - a bare `<guid>` instrumentation key

use crate::error::{ConfigError, ConfigResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;

static INSTRUMENTATION_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("Failed to compile instrumentation key regex")
});

/// Ingestion endpoint used when the connection string names none.
pub const DEFAULT_INGESTION_ENDPOINT: &str = "https://dc.services.visualstudio.com";

/// A parsed connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Instrumentation key identifying the telemetry resource
    pub instrumentation_key: String,

    /// Base URL of the ingestion service, without trailing slash
    pub ingestion_endpoint: String,

    /// Any other `key=value` segments, keyed as written
    pub extra: BTreeMap<String, String>,
}

impl ConnectionString {
    /// Parse a connection string.
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConfigError::InvalidConnectionString(
                "Cannot be empty".to_string(),
            ));
        }

        if !raw.contains('=') {
            return Self::validate_key(raw).map(|key| ConnectionString {
                instrumentation_key: key,
                ingestion_endpoint: DEFAULT_INGESTION_ENDPOINT.to_string(),
                extra: BTreeMap::new(),
            });
        }

        let mut instrumentation_key = None;
        let mut ingestion_endpoint = None;
        let mut extra = BTreeMap::new();

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                ConfigError::InvalidConnectionString(format!(
                    "Segment is not a key=value pair: {}",
                    segment
                ))
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key.to_ascii_lowercase().as_str() {
                "instrumentationkey" => instrumentation_key = Some(Self::validate_key(value)?),
                "ingestionendpoint" => ingestion_endpoint = Some(Self::validate_endpoint(value)?),
                _ => {
                    extra.insert(key.to_string(), value.to_string());
                }
            }
        }

        let instrumentation_key = instrumentation_key.ok_or_else(|| {
            ConfigError::InvalidConnectionString("Missing InstrumentationKey".to_string())
        })?;

        Ok(ConnectionString {
            instrumentation_key,
            ingestion_endpoint: ingestion_endpoint
                .unwrap_or_else(|| DEFAULT_INGESTION_ENDPOINT.to_string()),
            extra,
        })
    }

    fn validate_key(key: &str) -> ConfigResult<String> {
        if INSTRUMENTATION_KEY_REGEX.is_match(key) {
            Ok(key.to_ascii_lowercase())
        } else {
            Err(ConfigError::InvalidConnectionString(format!(
                "InstrumentationKey is not a GUID: {}",
                key
            )))
        }
    }

    fn validate_endpoint(endpoint: &str) -> ConfigResult<String> {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidConnectionString(
                "IngestionEndpoint must start with http:// or https://".to_string(),
            ));
        }
        Ok(endpoint.trim_end_matches('/').to_string())
    }
}

impl FromStr for ConnectionString {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
