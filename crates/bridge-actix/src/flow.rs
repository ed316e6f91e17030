use actix::Addr;
use url::Url;

use bridge_core::{generate_nonce, BridgeError, CallbackQuery, FlowOutcome, OAuthState};
use bridge_ports::DynAuthProvider;

use crate::actors::{mailbox_error, ConsumeState, RecordState, SessionActor};

/// One authorization-code flow, parameterized per request.
///
/// Carries no state of its own: CSRF nonces live in the `SessionActor` and the
/// app credentials live in the provider.
pub struct AuthFlow {
    provider: DynAuthProvider,
    sessions: Addr<SessionActor>,
    csrf_token_name: String,
}

impl AuthFlow {
    pub fn new(
        provider: DynAuthProvider,
        sessions: Addr<SessionActor>,
        csrf_token_name: String,
    ) -> Self {
        Self {
            provider,
            sessions,
            csrf_token_name,
        }
    }

    /// Issue a new CSRF nonce and return the provider URL to send the browser to.
    ///
    /// `url_state` is echoed back by `finish` untouched.
    pub async fn start(&self, url_state: Option<String>) -> Result<Url, BridgeError> {
        let nonce = generate_nonce();

        self.sessions
            .send(RecordState {
                nonce: nonce.clone(),
                csrf_token_name: self.csrf_token_name.clone(),
                span: tracing::Span::current(),
            })
            .await
            .map_err(|e| mailbox_error("session", e))?;

        let state = OAuthState::new(nonce, url_state).encode();
        self.provider.authorize_url(&state)
    }

    /// Validate the provider redirect and exchange its code for an access token.
    ///
    /// The CSRF nonce is checked (and consumed) before the provider's own error is
    /// looked at, so a forged redirect is always reported as a state failure.
    pub async fn finish(&self, query: &CallbackQuery) -> Result<FlowOutcome, BridgeError> {
        let state = non_empty(&query.state)
            .ok_or_else(|| BridgeError::invalid_request("Missing 'state' query parameter"))?;
        let response = match (non_empty(&query.code), non_empty(&query.error)) {
            (Some(code), None) => Ok(code),
            (None, Some(error)) => Err(error),
            (Some(_), Some(_)) => {
                return Err(BridgeError::invalid_request(
                    "Query parameters 'code' and 'error' are both set",
                ))
            }
            (None, None) => {
                return Err(BridgeError::invalid_request(
                    "Missing 'code' query parameter",
                ))
            }
        };

        let state = OAuthState::decode(state)?;

        self.sessions
            .send(ConsumeState {
                nonce: state.nonce,
                csrf_token_name: self.csrf_token_name.clone(),
                span: tracing::Span::current(),
            })
            .await
            .map_err(|e| mailbox_error("session", e))??;

        let code = match response {
            Ok(code) => code,
            Err(error) => {
                tracing::warn!(
                    error,
                    description = ?query.error_description,
                    "provider returned an authorization error"
                );
                return Err(if error == "access_denied" {
                    BridgeError::access_denied("The user did not approve the app")
                } else {
                    BridgeError::authorization_failed(
                        "The provider reported an authorization error",
                    )
                });
            }
        };

        let grant = self.provider.exchange_code(code).await?;

        Ok(FlowOutcome {
            access_token: grant.access_token,
            user_id: grant.user_id,
            url_state: state.url_state,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use async_trait::async_trait;
    use bridge_core::{AccessGrant, AccessToken};
    use bridge_ports::AuthProvider;
    use std::sync::Arc;

    const NAME: &str = "dropbox-auth-csrf-token";

    struct FixedProvider;

    #[async_trait]
    impl AuthProvider for FixedProvider {
        fn authorize_url(&self, state: &str) -> Result<Url, BridgeError> {
            let mut url = Url::parse("https://provider.test/authorize")
                .map_err(|e| BridgeError::server_error(&e.to_string()))?;
            url.query_pairs_mut().append_pair("state", state);
            Ok(url)
        }

        async fn exchange_code(&self, code: &str) -> Result<AccessGrant, BridgeError> {
            if code == "good" {
                Ok(AccessGrant {
                    access_token: AccessToken::new("token"),
                    user_id: "dbid:user".to_string(),
                })
            } else {
                Err(BridgeError::authorization_failed("rejected"))
            }
        }
    }

    fn flow() -> AuthFlow {
        AuthFlow::new(
            Arc::new(FixedProvider),
            SessionActor::new(600).start(),
            NAME.to_string(),
        )
    }

    fn issued_state(url: &Url) -> String {
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    fn callback(state: &str, code: Option<&str>, error: Option<&str>) -> CallbackQuery {
        CallbackQuery {
            state: Some(state.to_string()),
            code: code.map(str::to_string),
            error: error.map(str::to_string),
            error_description: None,
        }
    }

    #[actix_rt::test]
    async fn url_state_survives_the_round_trip() {
        let flow = flow();
        let url = flow.start(Some("next|page".to_string())).await.unwrap();
        let state = issued_state(&url);

        let outcome = flow.finish(&callback(&state, Some("good"), None)).await.unwrap();
        assert_eq!(outcome.access_token.secret(), "token");
        assert_eq!(outcome.user_id, "dbid:user");
        assert_eq!(outcome.url_state.as_deref(), Some("next|page"));
    }

    #[actix_rt::test]
    async fn forged_state_wins_over_provider_error() {
        let err = flow()
            .finish(&callback("forged", None, Some("access_denied")))
            .await
            .unwrap_err();
        assert_eq!(err.error, "authorization_failed");
    }

    #[actix_rt::test]
    async fn provider_error_consumes_the_nonce() {
        let flow = flow();
        let state = issued_state(&flow.start(None).await.unwrap());

        let err = flow
            .finish(&callback(&state, None, Some("access_denied")))
            .await
            .unwrap_err();
        assert_eq!(err.error, "access_denied");

        let err = flow
            .finish(&callback(&state, Some("good"), None))
            .await
            .unwrap_err();
        assert_eq!(err.error, "authorization_failed");
    }

    #[actix_rt::test]
    async fn code_and_error_together_is_invalid() {
        let err = flow()
            .finish(&callback("anything", Some("good"), Some("server_error")))
            .await
            .unwrap_err();
        assert_eq!(err.error, "invalid_request");
    }

    #[actix_rt::test]
    async fn missing_state_is_invalid() {
        let err = flow()
            .finish(&CallbackQuery {
                code: Some("good".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.error, "invalid_request");
    }
}
