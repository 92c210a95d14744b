//! Telemetry initialization: structured logging and Prometheus metrics

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise logging and the metrics recorder.
///
/// Returns a `PrometheusHandle` so the HTTP server can expose `/metrics`.
pub fn init(environment: &str) -> anyhow::Result<PrometheusHandle> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "janus_admin=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Production logs are shipped as JSON; development keeps the compact form
    if environment == "production" {
        let fmt_layer = tracing_subscriber::fmt::layer().json().flatten_event(true);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer();
        registry.with(fmt_layer).init();
    }

    let handle = install_prometheus_recorder()?;
    describe_metrics();
    Ok(handle)
}

fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    // Common Prometheus buckets plus sub-millisecond ones for fast endpoints
    let buckets = [
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets(&buckets)
        .map_err(|e| anyhow::anyhow!("failed to set histogram buckets: {}", e))?
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;
    Ok(handle)
}

/// Register metric descriptions so Prometheus output includes HELP/TYPE lines
/// from startup.
fn describe_metrics() {
    describe_counter!("janus_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "janus_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "janus_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );
}
