use async_trait::async_trait;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    ExtraTokenFields, RedirectUrl, RequestTokenError, StandardRevocableToken,
    StandardTokenResponse, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use url::Url;

use bridge_config::DropboxConfig;
use bridge_core::{AccessGrant, AccessToken, BridgeError};
use bridge_ports::AuthProvider;

/// Non-standard fields Dropbox adds to its token response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropboxTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl ExtraTokenFields for DropboxTokenFields {}

pub type DropboxTokenResponse = StandardTokenResponse<DropboxTokenFields, BasicTokenType>;

type DropboxOAuthClient = oauth2::Client<
    BasicErrorResponse,
    DropboxTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Authorization-code grant against Dropbox.
///
/// Holds only the static app credentials; a fresh `oauth2` client is built for
/// every call so no per-flow state ever lives here.
pub struct DropboxAuthProvider {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    http: reqwest::Client,
}

impl DropboxAuthProvider {
    pub fn new(config: &DropboxConfig, http: reqwest::Client) -> Result<Self, String> {
        let auth_url = AuthUrl::new(config.authorize_url.clone())
            .map_err(|e| format!("Invalid authorize URL: {}", e))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| format!("Invalid token URL: {}", e))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| format!("Invalid redirect URI: {}", e))?;

        Ok(Self {
            client_id: ClientId::new(config.app_key.clone()),
            client_secret: ClientSecret::new(config.app_secret.clone()),
            auth_url,
            token_url,
            redirect_url,
            http,
        })
    }

    fn oauth_client(&self) -> DropboxOAuthClient {
        oauth2::Client::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
    }
}

#[async_trait]
impl AuthProvider for DropboxAuthProvider {
    fn authorize_url(&self, state: &str) -> Result<Url, BridgeError> {
        let state = state.to_string();
        let (url, _csrf_token) = self
            .oauth_client()
            .authorize_url(move || CsrfToken::new(state))
            .url();
        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessGrant, BridgeError> {
        let token = self
            .oauth_client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(map_token_error)?;

        let extra = token.extra_fields();
        let user_id = extra
            .account_id
            .clone()
            .or_else(|| extra.uid.clone())
            .unwrap_or_default();

        tracing::debug!(user_id = %user_id, "Dropbox token exchange succeeded");

        Ok(AccessGrant {
            access_token: AccessToken::new(token.access_token().secret().clone()),
            user_id,
        })
    }
}

/// Provider refusals become authorization failures; anything else is an upstream fault.
fn map_token_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> BridgeError
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(response) => {
            tracing::warn!(error = %response, "Dropbox rejected the authorization code");
            BridgeError::authorization_failed("The authorization code was rejected")
        }
        other => {
            tracing::error!(error = %other, "Dropbox token exchange failed");
            BridgeError::upstream("Could not complete authorization with Dropbox")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2::basic::BasicErrorResponseType;

    fn provider() -> DropboxAuthProvider {
        let config = DropboxConfig {
            app_key: "app-key".to_string(),
            app_secret: "app-secret".to_string(),
            ..DropboxConfig::default()
        };
        let http = crate::build_http_client().expect("http client");
        DropboxAuthProvider::new(&config, http).expect("provider")
    }

    #[test]
    fn authorize_url_carries_the_caller_state() {
        let url = provider().authorize_url("nonce|next").expect("url");
        assert_eq!(url.host_str(), Some("www.dropbox.com"));
        assert_eq!(url.path(), "/oauth2/authorize");

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "app-key".to_string())));
        assert!(pairs.contains(&("state".to_string(), "nonce|next".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8080/redirect_uri".to_string()
        )));
        assert!(!url.as_str().contains("app-secret"));
    }

    #[test]
    fn invalid_redirect_uri_is_rejected_at_construction() {
        let config = DropboxConfig {
            redirect_uri: "::not a url::".to_string(),
            ..DropboxConfig::default()
        };
        let http = crate::build_http_client().expect("http client");
        let err = DropboxAuthProvider::new(&config, http).err().expect("error");
        assert!(err.contains("redirect URI"));
    }

    #[test]
    fn rejected_code_maps_to_authorization_failure() {
        let err: RequestTokenError<std::io::Error, BasicErrorResponse> =
            RequestTokenError::ServerResponse(BasicErrorResponse::new(
                BasicErrorResponseType::InvalidGrant,
                Some("code doesn't exist or has expired".to_string()),
                None,
            ));
        let mapped = map_token_error(err);
        assert_eq!(mapped.error, "authorization_failed");
        assert!(!mapped
            .error_description
            .unwrap_or_default()
            .contains("expired"));
    }

    #[test]
    fn transport_failure_maps_to_upstream_error() {
        let err: RequestTokenError<std::io::Error, BasicErrorResponse> =
            RequestTokenError::Other("connection reset".to_string());
        assert_eq!(map_token_error(err).error, "upstream_error");
    }

    #[test]
    fn token_response_extracts_account_id() {
        let token: DropboxTokenResponse = serde_json::from_str(
            r#"{"access_token":"sl.abc","token_type":"bearer","account_id":"dbid:AAH","uid":"12345"}"#,
        )
        .expect("parse");
        assert_eq!(token.access_token().secret(), "sl.abc");
        assert_eq!(token.extra_fields().account_id.as_deref(), Some("dbid:AAH"));
    }
}
