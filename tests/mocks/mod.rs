//! Test doubles shared by the integration tests.

mod mock_telemetry_client;

#[allow(unused_imports)]
pub use mock_telemetry_client::{MockClientFactory, MockTelemetryClient};
