use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "actix")]
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

pub const INVALID_REQUEST: &str = "invalid_request";
pub const AUTHORIZATION_FAILED: &str = "authorization_failed";
pub const ACCESS_DENIED: &str = "access_denied";
pub const UNAUTHENTICATED: &str = "unauthenticated";
pub const NOT_FOUND: &str = "not_found";
pub const UPSTREAM_ERROR: &str = "upstream_error";
pub const SERVER_ERROR: &str = "server_error";

/// Error body returned by every failing endpoint.
///
/// Descriptions are deliberately generic for authorization and upstream failures;
/// provider details go to the log, not to the caller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BridgeError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl BridgeError {
    pub fn new(error: &str, description: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            error_description: description.map(|s| s.to_string()),
        }
    }

    pub fn invalid_request(description: &str) -> Self {
        Self::new(INVALID_REQUEST, Some(description))
    }

    /// CSRF/state mismatch or a code the provider refused to exchange.
    pub fn authorization_failed(description: &str) -> Self {
        Self::new(AUTHORIZATION_FAILED, Some(description))
    }

    /// The user declined consent at the provider.
    pub fn access_denied(description: &str) -> Self {
        Self::new(ACCESS_DENIED, Some(description))
    }

    /// A storage call was made before any authorization completed.
    pub fn unauthenticated() -> Self {
        Self::new(
            UNAUTHENTICATED,
            Some("No Dropbox account has been authorized yet. Visit /dropbox-auth-start first."),
        )
    }

    pub fn not_found(description: &str) -> Self {
        Self::new(NOT_FOUND, Some(description))
    }

    pub fn upstream(description: &str) -> Self {
        Self::new(UPSTREAM_ERROR, Some(description))
    }

    pub fn server_error(description: &str) -> Self {
        Self::new(SERVER_ERROR, Some(description))
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.error == UNAUTHENTICATED
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> u16 {
        match self.error.as_str() {
            INVALID_REQUEST | AUTHORIZATION_FAILED => 400,
            UNAUTHENTICATED => 401,
            ACCESS_DENIED => 403,
            NOT_FOUND => 404,
            UPSTREAM_ERROR => 502,
            _ => 500,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for BridgeError {}

#[cfg(feature = "actix")]
impl ResponseError for BridgeError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classes_map_to_distinct_statuses() {
        assert_eq!(BridgeError::invalid_request("missing code").status(), 400);
        assert_eq!(BridgeError::authorization_failed("bad state").status(), 400);
        assert_eq!(BridgeError::unauthenticated().status(), 401);
        assert_eq!(BridgeError::access_denied("declined").status(), 403);
        assert_eq!(BridgeError::not_found("no such folder").status(), 404);
        assert_eq!(BridgeError::upstream("dropbox unavailable").status(), 502);
        assert_eq!(BridgeError::server_error("mailbox closed").status(), 500);
    }

    #[test]
    fn serialized_body_omits_missing_description() {
        let body = serde_json::to_value(BridgeError::new("server_error", None)).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "server_error" }));
        assert_eq!(BridgeError::new("server_error", None).to_string(), "server_error");
    }
}
