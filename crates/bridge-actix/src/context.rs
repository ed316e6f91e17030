use actix::{Actor, Addr};

use bridge_core::BridgeError;
use bridge_observability::Metrics;
use bridge_ports::{DynAuthProvider, DynStorageApi, DynStorageConnector};

use crate::actors::{mailbox_error, AuthorizedClient, ClientActor, CurrentClient, SessionActor, StoreClient};
use crate::flow::AuthFlow;

/// Everything a request handler needs, registered once as `web::Data<BridgeContext>`.
#[derive(Clone)]
pub struct BridgeContext {
    pub provider: DynAuthProvider,
    pub connector: DynStorageConnector,
    pub sessions: Addr<SessionActor>,
    pub clients: Addr<ClientActor>,
    pub csrf_token_name: String,
    pub metrics: Metrics,
}

impl BridgeContext {
    /// Start the session and client actors on the current arbiter.
    ///
    /// Must be called from within a running actix system.
    pub fn start(
        provider: DynAuthProvider,
        connector: DynStorageConnector,
        csrf_token_name: String,
        session_ttl_seconds: u64,
        metrics: Metrics,
    ) -> Self {
        Self {
            provider,
            connector,
            sessions: SessionActor::new(session_ttl_seconds).start(),
            clients: ClientActor::new().start(),
            csrf_token_name,
            metrics,
        }
    }

    /// A fresh flow for this request.
    pub fn auth_flow(&self) -> AuthFlow {
        AuthFlow::new(
            self.provider.clone(),
            self.sessions.clone(),
            self.csrf_token_name.clone(),
        )
    }

    pub async fn store_client(&self, client: AuthorizedClient) -> Result<(), BridgeError> {
        self.clients
            .send(StoreClient {
                client,
                span: tracing::Span::current(),
            })
            .await
            .map_err(|e| mailbox_error("client", e))
    }

    /// The authorized storage client, or `unauthenticated` before the first callback.
    pub async fn current_client(&self) -> Result<DynStorageApi, BridgeError> {
        let client = self
            .clients
            .send(CurrentClient {
                span: tracing::Span::current(),
            })
            .await
            .map_err(|e| mailbox_error("client", e))??;
        Ok(client.api)
    }
}
