use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::ObservabilityConfig;

const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Failed to initialize OpenTelemetry: {0}")]
    OpenTelemetryInit(#[from] opentelemetry::trace::TraceError),
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize structured logging and, when enabled, OpenTelemetry trace export
pub fn init_observability(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    let opentelemetry_layer = if config.enable_tracing {
        let tracer = init_opentelemetry_tracer(
            &config.service_name,
            &config.service_version,
            config.otlp_endpoint.as_deref(),
        )?;
        Some(OpenTelemetryLayer::new(tracer))
    } else {
        None
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(&config.service_name, &config.log_level).into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(opentelemetry_layer);

    let result = if config.enable_json_logging {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_target(false)
                    .with_level(true)
                    .with_span_events(FmtSpan::NONE)
                    .boxed(),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .boxed(),
            )
            .try_init()
    };
    result.map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;

    info!(
        "Observability initialized for service: {} v{}",
        config.service_name, config.service_version
    );
    Ok(())
}

/// Filter directives used when `RUST_LOG` is not set
fn default_filter(service_name: &str, log_level: &str) -> String {
    format!(
        "{}={level},cart_rs={level},tower_http=info,aws_sdk_dynamodb=info,aws_config=warn",
        service_name.replace('-', "_"),
        level = log_level
    )
}

/// Extract the current trace ID from the active span context
pub fn get_current_trace_id() -> Option<String> {
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let current_span = tracing::Span::current();
    let context = current_span.context();
    let span = context.span();
    let span_context = span.span_context();

    if span_context.is_valid() {
        Some(span_context.trace_id().to_string())
    } else {
        None
    }
}

fn init_opentelemetry_tracer(
    service_name: &str,
    service_version: &str,
    otlp_endpoint: Option<&str>,
) -> Result<opentelemetry_sdk::trace::Tracer, ObservabilityError> {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", service_version.to_string()),
        KeyValue::new("service.namespace", "shop"),
        KeyValue::new("telemetry.sdk.language", "rust"),
    ]);

    let endpoint = otlp_endpoint
        .filter(|endpoint| !endpoint.is_empty())
        .unwrap_or(DEFAULT_OTLP_ENDPOINT);

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .with_batch_config(
            trace::BatchConfig::default()
                .with_max_queue_size(2048)
                .with_max_export_batch_size(512)
                .with_scheduled_delay(Duration::from_millis(500)),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    Ok(tracer)
}

/// Flush pending spans, giving up after five seconds
pub async fn shutdown_observability() {
    info!("Shutting down observability");

    // The provider shutdown blocks while spans drain
    let shutdown_task = tokio::task::spawn_blocking(global::shutdown_tracer_provider);

    match tokio::time::timeout(Duration::from_secs(5), shutdown_task).await {
        Ok(Ok(())) => info!("Observability shutdown completed successfully"),
        Ok(Err(e)) => warn!("Error during observability shutdown: {}", e),
        Err(_) => warn!("Observability shutdown timed out after 5 seconds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_observability_timeout() {
        let start = std::time::Instant::now();
        shutdown_observability().await;

        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[test]
    fn test_default_filter_uses_log_level() {
        let filter = default_filter("cart-rs", "debug");

        assert!(filter.starts_with("cart_rs=debug"));
        assert!(filter.contains("tower_http=info"));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_trace_id_absent_outside_spans() {
        assert!(get_current_trace_id().is_none());
    }
}
