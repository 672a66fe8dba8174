//! Metric records and the caller-supplied templates they are built from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary metric dimensions attached to each recorded measurement.
pub type Properties = Map<String, Value>;

/// Property key carrying whether the measured unit failed.
pub const DID_ERROR_KEY: &str = "didError";

/// Property key carrying the failure message of the measured unit.
pub const ERROR_MESSAGE_KEY: &str = "errorMessage";

/// A single reported measurement.
///
/// `value` is always the elapsed time of the unit of work in seconds. The
/// properties always carry [`DID_ERROR_KEY`], and [`ERROR_MESSAGE_KEY`] when
/// the unit failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    /// Metric name, copied from the request
    pub name: String,

    /// Elapsed time in seconds
    pub value: f64,

    /// Caller properties merged with the engine-computed error state
    pub properties: Properties,
}

impl Metric {
    /// Whether this measurement recorded a failed unit.
    pub fn did_error(&self) -> bool {
        self.properties
            .get(DID_ERROR_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The recorded failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.properties.get(ERROR_MESSAGE_KEY).and_then(Value::as_str)
    }
}

/// Template for the metric recorded around a unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MetricRequest {
    /// Name reported for every measurement made with this template
    pub name: String,

    /// Extra dimensions copied onto each measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl MetricRequest {
    /// Create a request with no extra properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: None,
        }
    }

    /// Add a property to the template.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = MetricRequest::new("checkout")
            .with_property("region", "uksouth")
            .with_property("attempt", 2);

        assert_eq!(request.name, "checkout");
        let props = request.properties.unwrap();
        assert_eq!(props.get("region"), Some(&json!("uksouth")));
        assert_eq!(props.get("attempt"), Some(&json!(2)));
    }

    #[test]
    fn test_request_deserializes_without_properties() {
        let request: MetricRequest = serde_json::from_str(r#"{"name":"m"}"#).unwrap();
        assert_eq!(request, MetricRequest::new("m"));
    }

    #[test]
    fn test_metric_error_accessors() {
        let mut properties = Properties::new();
        properties.insert(DID_ERROR_KEY.to_string(), json!(true));
        properties.insert(ERROR_MESSAGE_KEY.to_string(), json!("boom"));

        let metric = Metric {
            name: "m".to_string(),
            value: 0.5,
            properties,
        };

        assert!(metric.did_error());
        assert_eq!(metric.error_message(), Some("boom"));
    }
}
