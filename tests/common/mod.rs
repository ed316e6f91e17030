#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::{form_urlencoded, Url};

use dropbox_oauth_bridge::models::{AccessGrant, AccessToken, BridgeError};
use dropbox_oauth_bridge::ports::{AuthProvider, DynStorageApi, StorageApi, StorageConnector};
use dropbox_oauth_bridge::{BridgeContext, Metrics};

pub const CSRF_TOKEN_NAME: &str = "dropbox-auth-csrf-token";
pub const AUTHORIZE_URL: &str = "https://www.dropbox.com/oauth2/authorize";

/// Stands in for Dropbox's OAuth endpoints: every code in `codes` exchanges to a fixed token.
pub struct MockProvider {
    codes: HashMap<String, (String, String)>,
}

impl MockProvider {
    pub fn new(codes: &[(&str, &str, &str)]) -> Self {
        Self {
            codes: codes
                .iter()
                .map(|(code, token, user)| {
                    (code.to_string(), (token.to_string(), user.to_string()))
                })
                .collect(),
        }
    }
}

#[async_trait]
impl AuthProvider for MockProvider {
    fn authorize_url(&self, state: &str) -> Result<Url, BridgeError> {
        let mut url = Url::parse(AUTHORIZE_URL).expect("static url");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", "test-app")
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessGrant, BridgeError> {
        match self.codes.get(code) {
            Some((token, user)) => Ok(AccessGrant {
                access_token: AccessToken::new(token.clone()),
                user_id: user.clone(),
            }),
            None => Err(BridgeError::authorization_failed(
                "The authorization code was rejected",
            )),
        }
    }
}

/// Records every storage call as `(access_token, operation, path)`.
#[derive(Clone, Default)]
pub struct MockConnector {
    pub calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockConnector {
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl StorageConnector for MockConnector {
    fn connect(&self, access_token: AccessToken) -> DynStorageApi {
        Arc::new(MockStorage {
            token: access_token.secret().to_string(),
            calls: self.calls.clone(),
        })
    }
}

struct MockStorage {
    token: String,
    calls: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockStorage {
    fn record(&self, operation: &str, path: &str) {
        self.calls.lock().expect("calls lock").push((
            self.token.clone(),
            operation.to_string(),
            path.to_string(),
        ));
    }
}

/// The account document a client built from `token` answers with.
pub fn account_for(token: &str) -> Value {
    json!({
        "account_id": format!("dbid:{}", token),
        "name": { "display_name": "Test User" },
        "email": "user@example.test"
    })
}

#[async_trait]
impl StorageApi for MockStorage {
    async fn account_info(&self) -> Result<Value, BridgeError> {
        self.record("account_info", "");
        Ok(account_for(&self.token))
    }

    async fn metadata(&self, path: &str) -> Result<Value, BridgeError> {
        self.record("metadata", path);
        Ok(json!({ ".tag": "folder", "path_display": path, "contents": [] }))
    }
}

pub fn default_provider() -> MockProvider {
    MockProvider::new(&[
        ("code-a", "token-a", "dbid:user-a"),
        ("code-b", "token-b", "dbid:user-b"),
    ])
}

pub fn setup_context(provider: MockProvider, connector: MockConnector) -> BridgeContext {
    let metrics = Metrics::new().expect("metrics");
    BridgeContext::start(
        Arc::new(provider),
        Arc::new(connector),
        CSRF_TOKEN_NAME.to_string(),
        600,
        metrics,
    )
}

/// The `state` query parameter of a provider authorization URL.
pub fn state_from_location(location: &str) -> String {
    let url = Url::parse(location).expect("location is an absolute URL");
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("authorization URL carries state")
}

/// Callback URI as Dropbox would build it.
pub fn callback_uri(path: &str, params: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        query.append_pair(k, v);
    }
    format!("{}?{}", path, query.finish())
}

/// Build the bridge `App` with the same middleware stack the server uses.
macro_rules! bridge_app {
    ($ctx:expr) => {{
        let ctx: dropbox_oauth_bridge::BridgeContext = $ctx;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(ctx.clone()))
                .wrap(dropbox_oauth_bridge::middleware::CorsHeaders)
                .wrap(dropbox_oauth_bridge::middleware::MetricsMiddleware::new(
                    ctx.metrics.clone(),
                ))
                .configure(dropbox_oauth_bridge::configure),
        )
        .await
    }};
}
