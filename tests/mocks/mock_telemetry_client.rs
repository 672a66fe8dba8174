use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use telemetry_metrics::error::{ConfigResult, TelemetryResult};
use telemetry_metrics::{ClientFactory, Metric, TelemetryClient, TransportOptions};

/// Mock telemetry client that records every call.
///
/// Clones share state, so a test can keep one handle while the service owns
/// another.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockTelemetryClient {
    metrics: Arc<Mutex<Vec<Metric>>>,
    options: Arc<Mutex<TransportOptions>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
}

#[allow(dead_code)]
impl MockTelemetryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics in the order they were recorded.
    pub fn tracked(&self) -> Vec<Metric> {
        self.metrics.lock().unwrap().clone()
    }

    pub fn option(&self, key: &str) -> Option<Value> {
        self.options.lock().unwrap().get(key).cloned()
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

impl TelemetryClient for MockTelemetryClient {
    fn track_metric(&self, metric: Metric) {
        self.track_call("track_metric");
        self.metrics.lock().unwrap().push(metric);
    }

    fn flush(&self) -> TelemetryResult<()> {
        self.track_call("flush");
        Ok(())
    }

    fn apply_options(&mut self, options: &TransportOptions) {
        self.track_call("apply_options");
        let mut current = self.options.lock().unwrap();
        for (key, value) in options {
            current.insert(key.clone(), value.clone());
        }
    }
}

/// Mock factory handing out [`MockTelemetryClient`]s and remembering them.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockClientFactory {
    created: Arc<Mutex<Vec<(String, MockTelemetryClient)>>>,
}

#[allow(dead_code)]
impl MockClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Connection strings passed to `create`, in order.
    pub fn connection_strings(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(cs, _)| cs.clone())
            .collect()
    }

    /// Handle to the most recently created client.
    pub fn last_client(&self) -> Option<MockTelemetryClient> {
        self.created
            .lock()
            .unwrap()
            .last()
            .map(|(_, client)| client.clone())
    }
}

impl ClientFactory for MockClientFactory {
    fn create(&self, connection_string: &str) -> ConfigResult<Box<dyn TelemetryClient>> {
        let client = MockTelemetryClient::new();
        self.created
            .lock()
            .unwrap()
            .push((connection_string.to_string(), client.clone()));
        Ok(Box::new(client))
    }
}
