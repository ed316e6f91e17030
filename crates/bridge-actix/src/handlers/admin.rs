use actix_web::{web, HttpResponse, Result};

use crate::context::BridgeContext;

/// Prometheus metrics.
pub async fn system_metrics(ctx: web::Data<BridgeContext>) -> Result<HttpResponse> {
    let buffer = bridge_observability::encode_prometheus_text(&ctx.metrics.registry)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer))
}

/// Health check endpoint
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "dropbox_oauth_bridge",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
