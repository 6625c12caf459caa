//! Logging setup, with optional OTLP export of traces and logs.

use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_SERVICE_NAME: &str = "potluck-server";

/// Quick TCP connect check so an absent collector doesn't stall or spam errors.
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

struct OtelProviders {
    tracer: SdkTracerProvider,
    logger: SdkLoggerProvider,
}

fn build_providers(endpoint: &str, service_name: &str) -> Result<OtelProviders, String> {
    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| format!("Failed to create OTLP trace exporter: {}", e))?;

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| format!("Failed to create OTLP log exporter: {}", e))?;

    Ok(OtelProviders {
        tracer: SdkTracerProvider::builder()
            .with_batch_exporter(span_exporter)
            .with_resource(resource.clone())
            .build(),
        logger: SdkLoggerProvider::builder()
            .with_batch_exporter(log_exporter)
            .with_resource(resource)
            .build(),
    })
}

/// Initializes the global subscriber. Console logging is always on, filtered
/// by `RUST_LOG`. If `OTEL_EXPORTER_OTLP_ENDPOINT` is set and reachable,
/// traces and logs are exported there too.
pub fn init() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));
    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());

    let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
    let mut status = match &endpoint {
        None => "OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only".to_string(),
        Some(endpoint) => format!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        ),
    };

    let providers = endpoint
        .as_deref()
        .filter(|endpoint| collector_reachable(endpoint))
        .and_then(|endpoint| match build_providers(endpoint, &service_name) {
            Ok(providers) => {
                status = format!(
                    "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                    endpoint, service_name
                );
                Some(providers)
            }
            Err(e) => {
                status = e;
                None
            }
        });

    let (trace_layer, log_layer) = match providers {
        Some(OtelProviders { tracer, logger }) => {
            let otel_tracer = tracer.tracer(DEFAULT_SERVICE_NAME);
            opentelemetry::global::set_tracer_provider(tracer);
            (
                Some(tracing_opentelemetry::layer().with_tracer(otel_tracer)),
                Some(OpenTelemetryTracingBridge::new(&logger)),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(trace_layer)
        .with(log_layer)
        .init();

    tracing::info!("{}", status);
}
