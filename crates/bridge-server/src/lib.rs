//! Runnable server assembly.
//!
//! Loads configuration, wires the Dropbox adapter into the HTTP layer and serves it.

use std::io;
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use bridge_actix::middleware::{CorsHeaders, MetricsMiddleware};
use bridge_actix::BridgeContext;
use bridge_config::Config;
use bridge_dropbox::{DropboxAuthProvider, DropboxConnector};
use bridge_observability::{init_telemetry, Metrics, ObservedConnector};
use bridge_ports::{DynAuthProvider, DynStorageConnector};

pub const SERVICE_NAME: &str = "dropbox_oauth_bridge";

fn startup_error(message: String) -> io::Error {
    eprintln!("Startup error: {}", message);
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// Build the shared request context from a validated configuration.
pub fn build_context(config: &Config, metrics: Metrics) -> Result<BridgeContext, String> {
    let http = bridge_dropbox::build_http_client()?;

    let provider: DynAuthProvider =
        Arc::new(DropboxAuthProvider::new(&config.dropbox, http.clone())?);

    let dropbox = DropboxConnector::new(http, &config.dropbox.api_url)?;
    let connector: DynStorageConnector = Arc::new(ObservedConnector::new(
        Arc::new(dropbox),
        "dropbox".to_string(),
        metrics.clone(),
    ));

    Ok(BridgeContext::start(
        provider,
        connector,
        config.dropbox.csrf_token_name.clone(),
        config.session.ttl_seconds,
        metrics,
    ))
}

/// Run the bridge until the HTTP server stops.
///
/// Missing or invalid credentials abort startup before anything is bound.
pub async fn run() -> io::Result<()> {
    let config = Config::load().map_err(startup_error)?;
    config.validate().map_err(startup_error)?;

    init_telemetry(SERVICE_NAME, config.server.debug)
        .map_err(|e| startup_error(format!("Failed to initialize telemetry: {}", e)))?;

    match serde_json::to_string(&config.sanitized()) {
        Ok(sanitized) => tracing::info!(config = %sanitized, "configuration loaded"),
        Err(e) => tracing::warn!(error = %e, "could not render sanitized configuration"),
    }

    let metrics = Metrics::new()
        .map_err(|e| startup_error(format!("Failed to register metrics: {}", e)))?;
    let ctx = build_context(&config, metrics.clone()).map_err(startup_error)?;

    let (host, port) = config.bind_address();
    tracing::info!(host = %host, port, debug = config.server.debug, "starting Dropbox OAuth2 bridge");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(ctx.clone()))
            .wrap(CorsHeaders)
            .wrap(MetricsMiddleware::new(metrics.clone()))
            .wrap(TracingLogger::default())
            .configure(bridge_actix::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
