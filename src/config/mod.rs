pub use bridge_config::*;
