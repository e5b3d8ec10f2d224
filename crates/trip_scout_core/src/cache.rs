//! crates/trip_scout_core/src/cache.rs
//!
//! Content-addressed cache of verified scout results.

use crate::domain::{ScoutCategory, ScoutItem, ScoutRequest};
use crate::ports::{KeyValueStore, PortError, PortResult};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const KEY_PREFIX: &str = "scout:";

/// Deterministic digest of every input that shapes generated content.
///
/// The profile goes in as a JSON object, which `serde_json` keeps with sorted
/// keys, so field order in the caller's data never changes the result.
pub fn fingerprint(category: ScoutCategory, request: &ScoutRequest) -> String {
    let profile = request
        .profile
        .as_ref()
        .and_then(|p| serde_json::to_value(p).ok())
        .unwrap_or_else(|| json!({}));

    let material = json!([
        category.fingerprint_tag(),
        request.destination,
        request.duration,
        request.interests,
        request.budget,
        request.radius,
        request.per_day,
        request.accommodation,
        request.pre_planned,
        profile,
    ]);

    let mut hasher = Sha256::new();
    hasher.update(material.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
pub struct ContentCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ContentCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// A miss, an unreadable entry and a store failure all read as `None`.
    pub async fn get(&self, fingerprint: &str) -> Option<Vec<ScoutItem>> {
        let key = format!("{}{}", KEY_PREFIX, fingerprint);
        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str::<Vec<ScoutItem>>(&raw) {
            Ok(items) => Some(items),
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Stores a result. Empty lists are never written, so they always stay retryable.
    pub async fn set(&self, fingerprint: &str, items: &[ScoutItem]) -> PortResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let key = format!("{}{}", KEY_PREFIX, fingerprint);
        let value = serde_json::to_string(items)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.store.set(&key, value, self.ttl).await?;
        info!(count = items.len(), "Cached scout result under {}", key);
        Ok(())
    }
}
