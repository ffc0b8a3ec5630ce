//! Cache facade
//!
//! The typed surface callers use. Values are JSON-encoded on the way in
//! and decoded on the way out; a miss is `Ok(None)`, distinguishable by
//! type from any stored value. Every `set` also records the key under
//! its field so the whole group can be invalidated later.

use fieldcache_domain::clock::Clock;
use fieldcache_domain::error::Result;
use fieldcache_domain::expire::Expire;
use fieldcache_domain::ports::CacheBackend;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Typed caching facade over a storage backend
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
}

impl Cache {
    /// Wrap a backend
    pub fn new(backend: Arc<dyn CacheBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Store `value` under `key` and record the key as a member of
    /// `field`. The index write is skipped when the value write fails.
    ///
    /// Stale field members left behind by later `delete` calls are
    /// tolerated; `clear` prunes them.
    pub async fn set<T: Serialize>(
        &self,
        field: &str,
        key: &str,
        value: &T,
        expire: Expire,
    ) -> Result<bool> {
        let expires_at = expire.resolve(self.clock.as_ref())?;
        let payload = serde_json::to_string(value)?;
        let stored = self.backend.set_raw(key, &payload, expires_at).await?;
        if !stored {
            tracing::debug!(backend = %self.backend.kind(), field, key, "cache write rejected");
            return Ok(false);
        }
        tracing::debug!(backend = %self.backend.kind(), field, key, expires_at, "cache set");
        self.backend.track_key(field, key, expires_at).await
    }

    /// Fetch the value stored under `key`; `None` on miss or expiry
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get_raw(key).await? {
            Some(raw) => {
                tracing::debug!(backend = %self.backend.kind(), key, "cache hit");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => {
                tracing::debug!(backend = %self.backend.kind(), key, "cache miss");
                Ok(None)
            }
        }
    }

    /// Remove `key`. Does not touch any field's tracked members.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        tracing::debug!(backend = %self.backend.kind(), key, "cache delete");
        self.backend.delete(key).await
    }

    /// Invalidate a whole field, or everything when no field is given
    pub async fn clear(&self, field: Option<&str>) -> Result<bool> {
        match field {
            Some(field) => {
                tracing::debug!(backend = %self.backend.kind(), field, "cache clear field");
                self.backend.clear_field(field).await
            }
            None => {
                tracing::debug!(backend = %self.backend.kind(), "cache clear all");
                self.backend.clear_all().await
            }
        }
    }

    /// Whether the underlying backend is actually usable (false for the
    /// null fallback)
    pub fn enabled(&self) -> bool {
        self.backend.enabled()
    }

    /// The underlying backend handle
    pub fn backend(&self) -> Arc<dyn CacheBackend> {
        self.backend.clone()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.backend)
            .finish()
    }
}
