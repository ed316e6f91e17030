pub mod error;
pub mod flow;
pub mod session;
pub mod token;

pub use error::*;
pub use flow::*;
pub use session::*;
pub use token::*;
