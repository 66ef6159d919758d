use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging.
///
/// Configures:
/// - `tracing-subscriber::fmt`, compact or JSON lines.
/// - `EnvFilter` for dynamic log levels (RUST_LOG).
pub fn init(json: bool) {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,novel_ssr=debug,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter_layer);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init();
    }
}

/// Install the global Prometheus recorder. The returned handle renders the
/// scrape body for `/metrics`.
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    metrics::describe_counter!("ssr_requests_total", "Rendered requests by target and status");
    metrics::describe_counter!("ssr_render_failures_total", "Failed renders by target");
    metrics::describe_histogram!(
        "ssr_render_duration_seconds",
        metrics::Unit::Seconds,
        "Route resolution plus render time"
    );
    Ok(handle)
}
