//! In-process shared-memory backend
//!
//! The in-process analog of a shared-memory cache extension, built on
//! Moka. TTL is native: every entry carries its own deadline, enforced
//! by a per-entry expiry policy, so no manifest or lazy read-side check
//! is needed.

use async_trait::async_trait;
use fieldcache_domain::clock::Clock;
use fieldcache_domain::error::Result;
use fieldcache_domain::expire::remaining_ttl;
use fieldcache_domain::ports::{BackendKind, CacheBackend};
use moka::future::Cache;
use moka::Expiry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default entry capacity
const DEFAULT_MAX_CAPACITY: u64 = 100_000;

/// Memory backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryBackendConfig {
    /// Maximum number of entries held before Moka starts evicting
    pub max_capacity: u64,
}

impl Default for MemoryBackendConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
        }
    }
}

#[derive(Clone)]
struct StoredEntry {
    payload: String,
    ttl: Duration,
}

/// Per-entry TTL policy: each entry expires at its own deadline
struct EntryTtl;

impl Expiry<String, StoredEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Moka-backed in-process backend
#[derive(Clone)]
pub struct MemoryBackend {
    cache: Cache<String, StoredEntry>,
    max_capacity: u64,
    clock: Arc<dyn Clock>,
}

impl MemoryBackend {
    /// Create a new memory backend
    pub fn new(config: MemoryBackendConfig, clock: Arc<dyn Clock>) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryTtl)
            .build();
        Self {
            cache,
            max_capacity: config.max_capacity,
            clock,
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn set_raw(&self, key: &str, payload: &str, expires_at: i64) -> Result<bool> {
        let now = self.clock.now_unix();
        match remaining_ttl(expires_at, now) {
            Some(ttl) => {
                self.cache
                    .insert(
                        key.to_string(),
                        StoredEntry {
                            payload: payload.to_string(),
                            ttl,
                        },
                    )
                    .await;
            }
            // Born expired: store nothing, drop any previous value.
            None => self.cache.invalidate(key).await,
        }
        Ok(true)
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|entry| entry.payload))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.cache.invalidate(key).await;
        Ok(true)
    }

    async fn clear_all(&self) -> Result<bool> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(true)
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("max_capacity", &self.max_capacity)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
