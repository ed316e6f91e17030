//! Integration ports for the bridge.
//!
//! The HTTP layer only talks to the provider through these traits, so the Dropbox
//! adapter can be swapped for a test double (or another provider) without touching handlers.

pub mod provider;

pub use provider::*;
