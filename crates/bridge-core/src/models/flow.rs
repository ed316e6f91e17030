use serde::Deserialize;

use super::error::BridgeError;
use super::token::AccessToken;

/// Separator between the CSRF nonce and caller-supplied state inside the OAuth `state` value.
pub const STATE_SEPARATOR: char = '|';

/// Query parameters the provider appends when redirecting back to us.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// The OAuth `state` parameter: a CSRF nonce plus optional opaque caller state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub nonce: String,
    pub url_state: Option<String>,
}

impl OAuthState {
    pub fn new(nonce: String, url_state: Option<String>) -> Self {
        Self { nonce, url_state }
    }

    pub fn encode(&self) -> String {
        match &self.url_state {
            Some(url_state) => format!("{}{}{}", self.nonce, STATE_SEPARATOR, url_state),
            None => self.nonce.clone(),
        }
    }

    /// Split a returned `state` value. Everything after the first separator is caller state.
    pub fn decode(state: &str) -> Result<Self, BridgeError> {
        let (nonce, url_state) = match state.split_once(STATE_SEPARATOR) {
            Some((nonce, rest)) => (nonce, Some(rest.to_string())),
            None => (state, None),
        };

        if nonce.is_empty() {
            return Err(BridgeError::authorization_failed(
                "CSRF token missing from state",
            ));
        }

        Ok(Self {
            nonce: nonce.to_string(),
            url_state,
        })
    }
}

/// What a completed authorization flow yields: `(access_token, user_id, url_state)`.
#[derive(Debug, Clone)]
pub struct FlowOutcome {
    pub access_token: AccessToken,
    pub user_id: String,
    pub url_state: Option<String>,
}
