// Domain models live in `bridge-core`.
pub use bridge_core::*;
