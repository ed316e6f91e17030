//! Library exports.
//!
//! The bridge is assembled from the crates under `crates/`. Re-exporting them here gives
//! integration tests and additional binaries a single dependency with stable paths.

pub mod actors;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod ports;

pub use bridge_actix::{configure, AuthFlow, BridgeContext};
pub use bridge_observability::Metrics;
pub use bridge_server::{build_context, run};
