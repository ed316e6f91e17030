pub mod cors;

pub use bridge_observability::actix::MetricsMiddleware;
pub use cors::CorsHeaders;
