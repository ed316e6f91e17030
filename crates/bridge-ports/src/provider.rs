use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use bridge_core::{AccessGrant, AccessToken, BridgeError};

/// OAuth2 authorization-code capability of the provider.
///
/// Implementations own the app credentials and redirect URI; CSRF bookkeeping is
/// done by the caller, which passes the fully composed `state` value in.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Build the provider authorization URL carrying `state`.
    fn authorize_url(&self, state: &str) -> Result<Url, BridgeError>;

    /// Exchange an authorization code for an access token.
    ///
    /// A code the provider refuses maps to `authorization_failed`; transport
    /// failures map to `upstream_error`.
    async fn exchange_code(&self, code: &str) -> Result<AccessGrant, BridgeError>;
}

/// Storage operations available once an account is authorized.
///
/// Responses are passed through as provider-defined JSON.
#[async_trait]
pub trait StorageApi: Send + Sync {
    async fn account_info(&self) -> Result<Value, BridgeError>;

    /// `path` is absolute (always starts with `/`).
    async fn metadata(&self, path: &str) -> Result<Value, BridgeError>;
}

/// Builds a storage client from an access token.
pub trait StorageConnector: Send + Sync {
    fn connect(&self, access_token: AccessToken) -> DynStorageApi;
}

pub type DynAuthProvider = Arc<dyn AuthProvider>;
pub type DynStorageApi = Arc<dyn StorageApi>;
pub type DynStorageConnector = Arc<dyn StorageConnector>;
