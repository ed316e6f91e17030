use actix::prelude::*;
use chrono::Utc;

use bridge_core::{BridgeError, PendingAuthorization, SessionStore};

/// Owns the CSRF session store; the mailbox serializes every access to it.
pub struct SessionActor {
    store: SessionStore,
}

impl SessionActor {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: SessionStore::with_ttl_seconds(ttl_seconds),
        }
    }
}

impl Actor for SessionActor {
    type Context = Context<Self>;
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct RecordState {
    pub nonce: String,
    pub csrf_token_name: String,
    pub span: tracing::Span,
}

impl Handler<RecordState> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: RecordState, _: &mut Self::Context) -> Self::Result {
        let _entered = tracing::debug_span!(
            parent: &msg.span,
            "actor.session.record",
            csrf_token_name = %msg.csrf_token_name
        )
        .entered();

        self.store.insert(msg.nonce, &msg.csrf_token_name, Utc::now());
        tracing::debug!(pending = self.store.len(), "recorded authorization state");
    }
}

#[derive(Message)]
#[rtype(result = "Result<PendingAuthorization, BridgeError>")]
pub struct ConsumeState {
    pub nonce: String,
    pub csrf_token_name: String,
    pub span: tracing::Span,
}

impl Handler<ConsumeState> for SessionActor {
    type Result = Result<PendingAuthorization, BridgeError>;

    fn handle(&mut self, msg: ConsumeState, _: &mut Self::Context) -> Self::Result {
        let _entered = tracing::debug_span!(
            parent: &msg.span,
            "actor.session.consume",
            csrf_token_name = %msg.csrf_token_name
        )
        .entered();

        let result = self
            .store
            .take(&msg.nonce, &msg.csrf_token_name, Utc::now());
        if let Err(e) = &result {
            tracing::warn!(reason = ?e.error_description, "rejected authorization state");
        }
        result
    }
}

#[derive(Message)]
#[rtype(result = "usize")]
pub struct PendingCount;

impl Handler<PendingCount> for SessionActor {
    type Result = usize;

    fn handle(&mut self, _: PendingCount, _: &mut Self::Context) -> Self::Result {
        self.store.purge_expired(Utc::now());
        self.store.len()
    }
}
