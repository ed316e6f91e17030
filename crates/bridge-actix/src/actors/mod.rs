pub mod client_actor;
pub mod session_actor;

pub use client_actor::*;
pub use session_actor::*;

use actix::MailboxError;
use bridge_core::BridgeError;

pub(crate) fn mailbox_error(actor: &str, err: MailboxError) -> BridgeError {
    tracing::error!(actor, error = %err, "actor mailbox failure");
    BridgeError::server_error("Internal state is unavailable")
}
