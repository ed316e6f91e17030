pub use bridge_actix::middleware::*;
