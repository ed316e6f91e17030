use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{field, Instrument};

use bridge_core::{AccessToken, BridgeError};
use bridge_ports::{DynStorageApi, DynStorageConnector, StorageApi, StorageConnector};

use crate::Metrics;

/// A thin wrapper around a `DynStorageApi` that creates a tracing span and bumps
/// `dropbox_upstream_requests_total` for each storage call.
///
/// This lets request spans (created by actix middleware) extend down into the
/// provider HTTP calls.
pub struct ObservedStorageApi {
    inner: DynStorageApi,
    provider: String,
    metrics: Metrics,
}

impl ObservedStorageApi {
    pub fn new(inner: DynStorageApi, provider: String, metrics: Metrics) -> Self {
        Self {
            inner,
            provider,
            metrics,
        }
    }

    fn record(&self, operation: &str, result: &Result<Value, BridgeError>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => e.error.as_str(),
        };
        self.metrics
            .upstream_requests_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
}

#[async_trait]
impl StorageApi for ObservedStorageApi {
    async fn account_info(&self) -> Result<Value, BridgeError> {
        let span = tracing::info_span!(
            "upstream",
            provider = %self.provider,
            operation = "account_info",
            error = field::Empty
        );
        let result = async { self.inner.account_info().await }
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.record("error", field::display(&e.error));
        }
        self.record("account_info", &result);
        result
    }

    async fn metadata(&self, path: &str) -> Result<Value, BridgeError> {
        let span = tracing::info_span!(
            "upstream",
            provider = %self.provider,
            operation = "metadata",
            path = %path,
            error = field::Empty
        );
        let result = async { self.inner.metadata(path).await }
            .instrument(span.clone())
            .await;
        if let Err(e) = &result {
            span.record("error", field::display(&e.error));
        }
        self.record("metadata", &result);
        result
    }
}

/// Wraps every client produced by `inner` in an `ObservedStorageApi`.
pub struct ObservedConnector {
    inner: DynStorageConnector,
    provider: String,
    metrics: Metrics,
}

impl ObservedConnector {
    pub fn new(inner: DynStorageConnector, provider: String, metrics: Metrics) -> Self {
        Self {
            inner,
            provider,
            metrics,
        }
    }
}

impl StorageConnector for ObservedConnector {
    fn connect(&self, access_token: AccessToken) -> DynStorageApi {
        let client = self.inner.connect(access_token);
        Arc::new(ObservedStorageApi::new(
            client,
            self.provider.clone(),
            self.metrics.clone(),
        ))
    }
}
