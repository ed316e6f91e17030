//! Dropbox adapter for the bridge ports.
//!
//! `DropboxAuthProvider` drives the OAuth2 authorization-code grant through the
//! `oauth2` crate; `DropboxConnector` hands out API v2 clients for an access token.

pub mod auth;
pub mod client;

pub use auth::{DropboxAuthProvider, DropboxTokenFields, DropboxTokenResponse};
pub use client::{DropboxClient, DropboxConnector};

/// HTTP client shared by the token exchange and the API clients.
///
/// Redirects are disabled: the token endpoint must never bounce us elsewhere (SSRF).
pub fn build_http_client() -> Result<reqwest::Client, String> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))
}
