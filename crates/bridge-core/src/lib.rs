//! Framework-agnostic domain types for the Dropbox OAuth2 bridge.
//!
//! Nothing in here knows about HTTP servers or the Dropbox wire format; the
//! session store and error taxonomy are shared by the adapters and the HTTP layer.

pub mod models;

pub use models::*;
