//! Logging and optional OpenTelemetry export
//!
//! Log lines go to stderr so they never interleave with console answers
//! on stdout. When an OTLP endpoint is given, agent spans (each tagged with
//! the run's `trace_id`) are also exported to a collector:
//!
//! ```text
//! multiagent → OTLP (gRPC) → OTel Collector → Tempo / Jaeger
//! ```

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset and the session is verbose
const VERBOSE_FILTER: &str = "info,multiagent=debug";
/// Filter used when `RUST_LOG` is unset and the session is quiet
const QUIET_FILTER: &str = "warn";

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        QUIET_FILTER
    }
}

/// Initialize logging, and span export when `otlp_endpoint` is set.
///
/// # Example
/// ```ignore
/// init_tracing("multiagent", true, Some("http://localhost:4317"))?;
/// ```
pub fn init_tracing(
    service_name: &str,
    verbose: bool,
    otlp_endpoint: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let otel_layer = match otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::Config::default().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", service_name.to_string()),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])))
                .install_batch(runtime::Tokio)?;

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    if let Some(endpoint) = otlp_endpoint {
        tracing::info!(service = service_name, endpoint, "OpenTelemetry tracing initialized");
    }

    Ok(())
}

/// Flush pending spans to the collector.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}
