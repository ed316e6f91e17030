use actix::prelude::*;
use chrono::{DateTime, Utc};

use bridge_core::BridgeError;
use bridge_ports::DynStorageApi;

/// The storage client produced by the most recent successful authorization.
#[derive(Clone)]
pub struct AuthorizedClient {
    pub api: DynStorageApi,
    pub user_id: String,
    pub authorized_at: DateTime<Utc>,
}

impl AuthorizedClient {
    pub fn new(api: DynStorageApi, user_id: String) -> Self {
        Self {
            api,
            user_id,
            authorized_at: Utc::now(),
        }
    }
}

/// Single process-wide client slot.
///
/// One writer (the OAuth callback) and many readers; messages are handled one at a
/// time, so a store is visible to every read sent after it and concurrent stores
/// can never interleave.
#[derive(Default)]
pub struct ClientActor {
    current: Option<AuthorizedClient>,
}

impl ClientActor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actor for ClientActor {
    type Context = Context<Self>;
}

/// Replace (never merge) the current client.
#[derive(Message)]
#[rtype(result = "()")]
pub struct StoreClient {
    pub client: AuthorizedClient,
    pub span: tracing::Span,
}

impl Handler<StoreClient> for ClientActor {
    type Result = ();

    fn handle(&mut self, msg: StoreClient, _: &mut Self::Context) -> Self::Result {
        let _entered = tracing::info_span!(
            parent: &msg.span,
            "actor.client.store",
            user_id = %msg.client.user_id
        )
        .entered();

        if let Some(previous) = self.current.replace(msg.client) {
            tracing::info!(previous_user_id = %previous.user_id, "replaced authorized client");
        } else {
            tracing::info!("stored first authorized client");
        }
    }
}

#[derive(Message)]
#[rtype(result = "Result<AuthorizedClient, BridgeError>")]
pub struct CurrentClient {
    pub span: tracing::Span,
}

impl Handler<CurrentClient> for ClientActor {
    type Result = Result<AuthorizedClient, BridgeError>;

    fn handle(&mut self, msg: CurrentClient, _: &mut Self::Context) -> Self::Result {
        let _entered = tracing::debug_span!(parent: &msg.span, "actor.client.current").entered();

        self.current.clone().ok_or_else(BridgeError::unauthenticated)
    }
}
