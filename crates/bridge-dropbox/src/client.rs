use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use bridge_core::{AccessToken, BridgeError};
use bridge_ports::{DynStorageApi, StorageApi, StorageConnector};

/// Dropbox API v2 client bound to one access token.
pub struct DropboxClient {
    http: reqwest::Client,
    api_url: Url,
    access_token: AccessToken,
}

impl DropboxClient {
    pub fn new(http: reqwest::Client, api_url: Url, access_token: AccessToken) -> Self {
        Self {
            http,
            api_url,
            access_token,
        }
    }

    fn endpoint(&self, route: &str) -> String {
        endpoint(&self.api_url, route)
    }

    /// POST a JSON RPC call and return the decoded JSON body.
    async fn rpc(&self, route: &str, body: &Value) -> Result<Value, BridgeError> {
        let response = self
            .http
            .post(self.endpoint(route))
            .bearer_auth(self.access_token.secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(route, error = %e, "Dropbox API request failed");
                BridgeError::upstream("Dropbox API request failed")
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(route, status = status.as_u16(), body = %body, "Dropbox API returned an error");
            return Err(classify_failure(status, &body));
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::error!(route, error = %e, "Dropbox API returned an unreadable body");
            BridgeError::upstream("Dropbox API returned an unreadable response")
        })
    }

    /// All entries of a folder, following `has_more` cursors.
    async fn list_folder(&self, path: &str) -> Result<Vec<Value>, BridgeError> {
        let mut page = self
            .rpc("files/list_folder", &json!({ "path": list_folder_path(path) }))
            .await?;
        let mut entries = take_entries(&mut page);

        while page.get("has_more").and_then(Value::as_bool) == Some(true) {
            let cursor = page
                .get("cursor")
                .and_then(Value::as_str)
                .ok_or_else(|| BridgeError::upstream("Dropbox API returned an unreadable response"))?
                .to_string();
            page = self
                .rpc("files/list_folder/continue", &json!({ "cursor": cursor }))
                .await?;
            entries.extend(take_entries(&mut page));
        }

        Ok(entries)
    }
}

#[async_trait]
impl StorageApi for DropboxClient {
    async fn account_info(&self) -> Result<Value, BridgeError> {
        self.rpc("users/get_current_account", &Value::Null).await
    }

    async fn metadata(&self, path: &str) -> Result<Value, BridgeError> {
        // get_metadata does not accept the root folder.
        let mut metadata = if path == "/" {
            json!({ ".tag": "folder", "name": "", "path_display": "/" })
        } else {
            self.rpc("files/get_metadata", &json!({ "path": path }))
                .await?
        };

        if is_folder(&metadata) {
            let contents = self.list_folder(path).await?;
            attach_contents(&mut metadata, contents);
        }

        Ok(metadata)
    }
}

/// Builds a `DropboxClient` per access token, sharing one HTTP connection pool.
pub struct DropboxConnector {
    http: reqwest::Client,
    api_url: Url,
}

impl DropboxConnector {
    pub fn new(http: reqwest::Client, api_url: &str) -> Result<Self, String> {
        let api_url = Url::parse(api_url).map_err(|e| format!("Invalid API URL: {}", e))?;
        Ok(Self { http, api_url })
    }
}

impl StorageConnector for DropboxConnector {
    fn connect(&self, access_token: AccessToken) -> DynStorageApi {
        Arc::new(DropboxClient::new(
            self.http.clone(),
            self.api_url.clone(),
            access_token,
        ))
    }
}

fn endpoint(api_url: &Url, route: &str) -> String {
    format!("{}/{}", api_url.as_str().trim_end_matches('/'), route)
}

/// Dropbox addresses the root folder as the empty string.
fn list_folder_path(path: &str) -> &str {
    if path == "/" {
        ""
    } else {
        path
    }
}

fn is_folder(metadata: &Value) -> bool {
    metadata.get(".tag").and_then(Value::as_str) == Some("folder")
}

fn take_entries(page: &mut Value) -> Vec<Value> {
    match page.get_mut("entries").map(Value::take) {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    }
}

fn attach_contents(metadata: &mut Value, contents: Vec<Value>) {
    if let Some(object) = metadata.as_object_mut() {
        object.insert("contents".to_string(), Value::Array(contents));
    }
}

/// Map a non-2xx Dropbox response to our taxonomy.
///
/// Dropbox reports endpoint-specific errors as 409 with an `error_summary` such as
/// `path/not_found/..`; those become 404. Everything else is an upstream failure.
fn classify_failure(status: StatusCode, body: &str) -> BridgeError {
    if status == StatusCode::CONFLICT {
        let summary = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error_summary").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();
        if summary.starts_with("path/not_found") || summary.starts_with("path/not_folder") {
            return BridgeError::not_found("No file or folder at that path");
        }
    }

    BridgeError::upstream("Dropbox API request failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let base = Url::parse("https://api.dropboxapi.com/2/").unwrap();
        assert_eq!(
            endpoint(&base, "files/get_metadata"),
            "https://api.dropboxapi.com/2/files/get_metadata"
        );
        let base = Url::parse("https://api.dropboxapi.com/2").unwrap();
        assert_eq!(
            endpoint(&base, "users/get_current_account"),
            "https://api.dropboxapi.com/2/users/get_current_account"
        );
    }

    #[test]
    fn root_folder_is_listed_with_empty_path() {
        assert_eq!(list_folder_path("/"), "");
        assert_eq!(list_folder_path("/Photos"), "/Photos");
    }

    #[test]
    fn folder_contents_are_attached_to_metadata() {
        let mut metadata = json!({ ".tag": "folder", "path_display": "/Photos" });
        assert!(is_folder(&metadata));

        let mut page = json!({
            "entries": [{ ".tag": "file", "name": "a.jpg" }],
            "has_more": false
        });
        let entries = take_entries(&mut page);
        attach_contents(&mut metadata, entries);

        assert_eq!(metadata["contents"][0]["name"], "a.jpg");
        assert!(!is_folder(&json!({ ".tag": "file" })));
    }

    #[test]
    fn missing_paths_become_not_found() {
        let body = r#"{"error_summary": "path/not_found/..", "error": {".tag": "path"}}"#;
        assert_eq!(classify_failure(StatusCode::CONFLICT, body).error, "not_found");
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "").error,
            "upstream_error"
        );
        assert_eq!(
            classify_failure(StatusCode::CONFLICT, "not json").error,
            "upstream_error"
        );
    }

    #[test]
    fn connector_rejects_invalid_api_url() {
        let http = crate::build_http_client().expect("http client");
        assert!(DropboxConnector::new(http, "not a url").is_err());
    }
}
