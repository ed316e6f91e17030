// Compatibility facade.
//
// The session and client actors live in `bridge-actix`.

pub use bridge_actix::actors::*;
