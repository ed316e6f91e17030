use actix_web::{web, HttpResponse, Result};

use bridge_core::BridgeError;

use crate::context::BridgeContext;

/// Absolute storage path for a `/metadata/{folder_path}` capture.
///
/// Leading slashes are collapsed so `/metadata//foo` does not become `//foo`.
pub fn storage_path(folder_path: &str) -> String {
    format!("/{}", folder_path.trim_start_matches('/'))
}

/// Metadata (and folder contents) for `/` + `folder_path`.
pub async fn metadata(
    folder_path: web::Path<String>,
    ctx: web::Data<BridgeContext>,
) -> Result<HttpResponse, BridgeError> {
    let client = ctx.current_client().await?;
    let path = storage_path(&folder_path);
    tracing::debug!(path = %path, "fetching metadata");

    let metadata = client.metadata(&path).await?;
    Ok(HttpResponse::Ok().json(metadata))
}

/// Account info of the currently authorized user.
pub async fn account_info(ctx: web::Data<BridgeContext>) -> Result<HttpResponse, BridgeError> {
    let client = ctx.current_client().await?;
    let account = client.account_info().await?;
    Ok(HttpResponse::Ok().json(account))
}
