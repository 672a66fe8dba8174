//! Assembly of metric records from a request template and a measured duration.

use crate::models::{Metric, MetricRequest, Properties, DID_ERROR_KEY, ERROR_MESSAGE_KEY};
use serde_json::Value;
use std::fmt::{Debug, Display};

/// Build the metric for one measured unit.
///
/// Caller properties are copied first; `didError` and `errorMessage` are then
/// set by the engine and take precedence over caller-supplied keys of the same
/// name.
pub fn build_metric(request: &MetricRequest, value: f64, error: Option<&str>) -> Metric {
    let mut properties = request.properties.clone().unwrap_or_else(Properties::new);

    match error {
        Some(message) => {
            properties.insert(DID_ERROR_KEY.to_string(), Value::Bool(true));
            properties.insert(
                ERROR_MESSAGE_KEY.to_string(),
                Value::String(message.to_string()),
            );
        }
        None => {
            properties.insert(DID_ERROR_KEY.to_string(), Value::Bool(false));
            properties.remove(ERROR_MESSAGE_KEY);
        }
    }

    Metric {
        name: request.name.clone(),
        value,
        properties,
    }
}

/// The message recorded for a failed unit.
///
/// Uses the error's `Display` text, or its `Debug` form when that is empty.
pub fn error_message<E: Display + Debug + ?Sized>(error: &E) -> String {
    let message = error.to_string();
    if message.is_empty() {
        format!("{:?}", error)
    } else {
        message
    }
}
