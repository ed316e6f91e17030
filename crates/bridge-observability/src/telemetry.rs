use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging.
///
/// - Emits JSON log lines via `tracing_subscriber`, each carrying the active span stack.
/// - `RUST_LOG` wins when set; otherwise the level is `debug` in debug mode and `info` otherwise.
/// - Bridges `log` records (e.g. from actix internals) into `tracing`.
pub fn init_telemetry(service_name: &str, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()?;

    // Ignore errors if a logger was already set (e.g., tests).
    let _ = tracing_log::LogTracer::init();

    let debug_enabled = debug;
    tracing::info!(service = service_name, debug = debug_enabled, "telemetry initialized");
    Ok(())
}
