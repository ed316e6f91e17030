use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;

use super::error::BridgeError;

/// A started-but-not-finished authorization attempt.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub csrf_token_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingAuthorization {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory CSRF session store keyed by per-flow nonce.
///
/// Entries are single use and expire after `ttl`. Expired entries are dropped
/// lazily whenever a new one is inserted, so the map stays bounded by the
/// number of flows started within one TTL window.
#[derive(Debug)]
pub struct SessionStore {
    entries: HashMap<String, PendingAuthorization>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn with_ttl_seconds(ttl_seconds: u64) -> Self {
        let seconds = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self::new(Duration::try_seconds(seconds).unwrap_or(Duration::MAX))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a freshly issued nonce under `csrf_token_name`.
    pub fn insert(&mut self, nonce: String, csrf_token_name: &str, now: DateTime<Utc>) {
        self.purge_expired(now);

        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(
            nonce,
            PendingAuthorization {
                csrf_token_name: csrf_token_name.to_string(),
                created_at: now,
                expires_at,
            },
        );
    }

    /// Consume `nonce`. The entry is removed whether or not it validates.
    pub fn take(
        &mut self,
        nonce: &str,
        csrf_token_name: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingAuthorization, BridgeError> {
        let pending = self
            .entries
            .remove(nonce)
            .ok_or_else(|| BridgeError::authorization_failed("Unknown or already used state"))?;

        if pending.is_expired(now) {
            return Err(BridgeError::authorization_failed(
                "Authorization attempt expired",
            ));
        }

        if pending.csrf_token_name != csrf_token_name {
            return Err(BridgeError::authorization_failed("CSRF token mismatch"));
        }

        Ok(pending)
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, pending| !pending.is_expired(now));
        before - self.entries.len()
    }
}

/// 16 random bytes, URL-safe base64 without padding.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
