use actix_web::web;

use crate::handlers;

/// Register every bridge endpoint.
///
/// Middleware (`CorsHeaders`, `MetricsMiddleware`) is applied by the caller on the `App`
/// so that it also covers unmatched routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/dropbox-auth-start", web::get().to(handlers::auth_start))
        .route("/redirect_uri", web::get().to(handlers::redirect_uri))
        .route("/dropbox-auth-finish", web::get().to(handlers::auth_finish))
        .route(
            "/metadata/{folder_path:.*}",
            web::get().to(handlers::metadata),
        )
        .route("/test", web::get().to(handlers::account_info))
        .route("/health", web::get().to(handlers::health))
        .route("/metrics", web::get().to(handlers::system_metrics));
}
