//! Integration tests for single-unit execution.

mod mocks;

use mocks::MockTelemetryClient;
use serde_json::json;
use std::time::Duration;
use telemetry_metrics::{ClientConfig, ExecuteError, Metric, MetricRequest, MetricsService};

const ERROR_MESSAGE: &str = "An error from executed function";

fn config() -> ClientConfig {
    ClientConfig::new()
        .with_connection_string("InstrumentationKey=647154e0-5f23-4329-b6aa-96108370b919")
        .with_option("disableAppInsights", true)
}

fn expected_metric(name: &str, duration: f64) -> Metric {
    let mut properties = serde_json::Map::new();
    properties.insert("didError".to_string(), json!(false));
    Metric {
        name: name.to_string(),
        value: duration,
        properties,
    }
}

fn expected_metric_with_error(name: &str, duration: f64) -> Metric {
    let mut metric = expected_metric(name, duration);
    metric.properties.insert("didError".to_string(), json!(true));
    metric
        .properties
        .insert("errorMessage".to_string(), json!(ERROR_MESSAGE));
    metric
}

fn slow_value() -> Result<&'static str, String> {
    std::thread::sleep(Duration::from_millis(2));
    Ok("A value")
}

#[test]
fn test_execute_returns_result_and_duration() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let metric = MetricRequest::new("testMetric");

    let measured = service.execute(slow_value, &metric, Some(&config())).unwrap();

    assert_eq!(measured.result, "A value");
    assert!(measured.duration > 0.0);
    assert_eq!(
        mock.tracked(),
        vec![expected_metric("testMetric", measured.duration)]
    );
}

#[test]
fn test_execute_records_error_then_returns_it() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let metric = MetricRequest::new("testMetric");

    let mut calls = 0;
    let err = service
        .execute(
            || {
                calls += 1;
                std::thread::sleep(Duration::from_millis(1));
                Err::<(), _>(ERROR_MESSAGE.to_string())
            },
            &metric,
            Some(&config()),
        )
        .unwrap_err();

    assert_eq!(calls, 1);
    assert_eq!(err.into_execution().as_deref(), Some(ERROR_MESSAGE));

    let tracked = mock.tracked();
    assert_eq!(tracked.len(), 1);
    let duration = tracked[0].value;
    assert!(duration > 0.0);
    assert_eq!(tracked[0], expected_metric_with_error("testMetric", duration));
}

#[test]
fn test_execute_copies_caller_properties() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let metric = MetricRequest::new("m").with_property("sampleDimension", "sampleDimensionValue");

    service.execute(slow_value, &metric, None).unwrap();

    let tracked = mock.tracked();
    assert_eq!(
        tracked[0].properties.get("sampleDimension"),
        Some(&json!("sampleDimensionValue"))
    );
    assert_eq!(tracked[0].properties.get("didError"), Some(&json!(false)));
}

#[test]
fn test_execute_scenario_with_mock_unit() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let config = ClientConfig::new().with_connection_string("X");

    let measured = service
        .execute(|| Ok::<_, String>("A value"), &MetricRequest::new("m"), Some(&config))
        .unwrap();

    assert_eq!(measured.result, "A value");
    assert!(measured.duration >= 0.0);
    assert_eq!(mock.tracked(), vec![expected_metric("m", measured.duration)]);
}

#[tokio::test]
async fn test_execute_async_returns_result_and_duration() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let metric = MetricRequest::new("testMetric");

    let measured = service
        .execute_async(
            || async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<_, String>("A value")
            },
            &metric,
            Some(&config()),
        )
        .await
        .unwrap();

    assert_eq!(measured.result, "A value");
    assert!(measured.duration >= 0.005);
    assert_eq!(
        mock.tracked(),
        vec![expected_metric("testMetric", measured.duration)]
    );
}

#[tokio::test]
async fn test_execute_async_records_rejection() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let metric = MetricRequest::new("testMetric");

    let result = service
        .execute_async(
            || async {
                tokio::time::sleep(Duration::from_millis(1)).await;
                Err::<(), _>(ERROR_MESSAGE.to_string())
            },
            &metric,
            Some(&config()),
        )
        .await;

    match result {
        Err(ExecuteError::Execution(message)) => assert_eq!(message, ERROR_MESSAGE),
        other => panic!("Expected execution error, got: {:?}", other),
    }

    let tracked = mock.tracked();
    assert_eq!(tracked.len(), 1);
    assert!(tracked[0].value > 0.0);
    assert_eq!(
        tracked[0],
        expected_metric_with_error("testMetric", tracked[0].value)
    );
}

#[test]
fn test_error_without_message_uses_debug_form() {
    #[derive(Debug)]
    struct Opaque;

    impl std::fmt::Display for Opaque {
        fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());

    let result = service.execute(|| Err::<(), _>(Opaque), &MetricRequest::new("m"), None);

    assert!(result.is_err());
    assert_eq!(mock.tracked()[0].error_message(), Some("Opaque"));
}

#[test]
fn test_repeated_execution_reuses_client() {
    let mock = MockTelemetryClient::new();
    let mut service = MetricsService::with_client(mock.clone());
    let metric = MetricRequest::new("m");

    for _ in 0..3 {
        service.execute(slow_value, &metric, Some(&config())).unwrap();
    }

    assert_eq!(mock.get_call_count("track_metric"), 3);
    assert_eq!(mock.get_call_count("apply_options"), 0);
}

#[test]
fn test_flush_delegates_to_client() {
    let mock = MockTelemetryClient::new();
    let service = MetricsService::with_client(mock.clone());

    service.flush_client().unwrap();

    assert_eq!(mock.get_call_count("flush"), 1);
}

#[test]
fn test_flush_async_delegates_to_client() {
    let mock = MockTelemetryClient::new();
    let service = MetricsService::with_client(mock.clone());

    tokio_test::block_on(service.flush_client_async()).unwrap();

    assert_eq!(mock.get_call_count("flush"), 1);
}
