//! Telemetry Metrics - usage sample
//!
//! Times a few units of work and reports them to the telemetry backend named by
//! `APPLICATIONINSIGHTS_CONNECTION_STRING` (a local `.env` file works too).

use anyhow::Result;
use std::time::Duration;
use telemetry_metrics::client::{resolve_client, IngestionClientFactory};
use telemetry_metrics::config::SAMPLING_PERCENTAGE_OPTION;
use telemetry_metrics::{ClientConfig, MetricRequest, MetricsService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn my_function() -> Result<&'static str, std::io::Error> {
    Ok("A value")
}

fn my_function_with_error() -> Result<&'static str, std::io::Error> {
    Err(std::io::Error::other("An error"))
}

async fn delayed_function(delay_ms: u64) -> Result<&'static str, std::io::Error> {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Ok("A value")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging (stderr only)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Connection string comes from the environment unless set here
    let config = ClientConfig::from_env()?.with_option(SAMPLING_PERCENTAGE_OPTION, 100);

    let metric = MetricRequest::new("telemetrymetrics-sampleMetric")
        .with_property("sampleDimension", "sampleDimensionValue");

    let mut service = MetricsService::new();

    // execute
    let res = service.execute(my_function, &metric, Some(&config))?;
    info!("Took {} seconds for {}", res.duration, res.result);

    // execute using a client built ahead of time and shared
    let shared_client = resolve_client(&IngestionClientFactory, Some(&config))?;
    let mut bound_service = MetricsService::with_shared_client(shared_client);
    let res = bound_service.execute(my_function, &metric, None)?;
    info!("Took {} seconds for {}", res.duration, res.result);

    // execute_async
    let res = service
        .execute_async(|| delayed_function(500), &metric, Some(&config))
        .await?;
    info!("Took {} seconds for {}", res.duration, res.result);

    // execute_all_async
    let outcome = service
        .execute_all_async(
            [500, 800].map(|delay| move || delayed_function(delay)),
            &metric,
            Some(&config),
        )
        .await?;
    for (result, duration) in outcome.results.iter().zip(&outcome.durations) {
        if let (Some(result), Some(duration)) = (result, duration) {
            info!("Took {} seconds for {}", duration, result);
        }
    }

    // execute with error
    if let Err(err) = service.execute(my_function_with_error, &metric, Some(&config)) {
        error!("Executed function returned error: {}", err);
    }

    service.flush_client_async().await?;
    bound_service.flush_client_async().await?;

    info!("Sample complete");
    Ok(())
}
