pub use bridge_actix::handlers::*;
