pub mod admin;
pub mod dropbox;
pub mod storage;

pub use admin::*;
pub use dropbox::*;
pub use storage::*;
