pub use bridge_ports::*;
