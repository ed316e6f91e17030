use actix_web::{http::header, web, HttpResponse, Result};
use serde::Deserialize;

use bridge_core::{BridgeError, CallbackQuery, FlowOutcome};

use crate::actors::AuthorizedClient;
use crate::context::BridgeContext;

fn no_store_headers(mut resp: HttpResponse) -> HttpResponse {
    resp.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    resp.headers_mut()
        .insert(header::PRAGMA, header::HeaderValue::from_static("no-cache"));
    resp
}

/// Run the completion half of the flow and record its outcome.
async fn finish_flow(
    ctx: &BridgeContext,
    query: &CallbackQuery,
) -> Result<FlowOutcome, BridgeError> {
    match ctx.auth_flow().finish(query).await {
        Ok(outcome) => {
            ctx.metrics.auth_flows_completed_total.inc();
            tracing::info!(user_id = %outcome.user_id, "Dropbox authorization completed");
            Ok(outcome)
        }
        Err(e) => {
            ctx.metrics
                .auth_flows_failed_total
                .with_label_values(&[e.error.as_str()])
                .inc();
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartQuery {
    /// Opaque value handed back after the callback.
    url_state: Option<String>,
}

/// Begin authorization: redirect the browser to Dropbox.
pub async fn auth_start(
    query: web::Query<StartQuery>,
    ctx: web::Data<BridgeContext>,
) -> Result<HttpResponse, BridgeError> {
    let url = ctx.auth_flow().start(query.into_inner().url_state).await?;
    ctx.metrics.auth_flows_started_total.inc();

    Ok(no_store_headers(
        HttpResponse::Found()
            .append_header((header::LOCATION, url.to_string()))
            .finish(),
    ))
}

/// OAuth callback registered with Dropbox.
///
/// Exchanges the code, makes the resulting client the process-wide client and
/// answers with the account info of the newly authorized user.
pub async fn redirect_uri(
    query: web::Query<CallbackQuery>,
    ctx: web::Data<BridgeContext>,
) -> Result<HttpResponse, BridgeError> {
    tracing::debug!(
        state = ?query.state,
        has_code = query.code.is_some(),
        "Dropbox redirected back"
    );

    let outcome = finish_flow(&ctx, &query).await?;

    let api = ctx.connector.connect(outcome.access_token);
    ctx.store_client(AuthorizedClient::new(api.clone(), outcome.user_id))
        .await?;

    let account = api.account_info().await?;
    Ok(no_store_headers(HttpResponse::Ok().json(account)))
}

/// Alternate completion endpoint: runs the same exchange, keeps nothing.
pub async fn auth_finish(
    query: web::Query<CallbackQuery>,
    ctx: web::Data<BridgeContext>,
) -> Result<HttpResponse, BridgeError> {
    finish_flow(&ctx, &query).await?;
    Ok(HttpResponse::Ok().finish())
}
