//! Actix-web HTTP surface for the Dropbox OAuth2 bridge.
//!
//! This crate intentionally contains framework-specific code (Actix handlers and actors).
//! Domain types live in `bridge-core`, while the provider is abstracted behind `bridge-ports`.

pub mod actors;
pub mod context;
pub mod flow;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use context::BridgeContext;
pub use flow::AuthFlow;
pub use routes::configure;
