//! Memcached server-pool backend
//!
//! Configuration supplies a pool of server URLs; the client distributes
//! keys across the pool with its own consistent hashing, so this backend
//! never routes keys itself. TTL is native (relative seconds at write
//! time). Group tracking uses the generic field index — memcached has no
//! list structure to lean on.
//!
//! `clear_all` maps to the server-side `flush` command: instantaneous,
//! but global to every key on the pool, including keys written by other
//! applications sharing the same servers. Not fixable at this layer.

use async_trait::async_trait;
use fieldcache_domain::clock::Clock;
use fieldcache_domain::error::{Error, Result};
use fieldcache_domain::expire::remaining_ttl;
use fieldcache_domain::ports::{BackendKind, CacheBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Memcached backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemcachedBackendConfig {
    /// Server pool, e.g. `["memcache://127.0.0.1:11211"]`. Required:
    /// there is no safe default pool.
    pub servers: Vec<String>,
}

/// Memcached-backed cache over a server pool
pub struct MemcachedBackend {
    client: memcache::Client,
    servers: Vec<String>,
    clock: Arc<dyn Clock>,
}

impl MemcachedBackend {
    /// Connect to the pool and probe it; an empty pool is a fatal
    /// configuration error, an unreachable one a storage error the
    /// registry turns into a null-backend fallback
    pub fn connect(config: MemcachedBackendConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.servers.is_empty() {
            return Err(Error::configuration(
                "memcached backend requires at least one server in the pool",
            ));
        }
        let client = memcache::connect(config.servers.clone())
            .map_err(|e| Error::storage(format!("memcached pool connect failed: {e}")))?;
        client
            .version()
            .map_err(|e| Error::storage(format!("memcached liveness check failed: {e}")))?;
        Ok(Self {
            client,
            servers: config.servers,
            clock,
        })
    }
}

#[async_trait]
impl CacheBackend for MemcachedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memcached
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn set_raw(&self, key: &str, payload: &str, expires_at: i64) -> Result<bool> {
        let now = self.clock.now_unix();
        let Some(ttl) = remaining_ttl(expires_at, now) else {
            // Born expired: drop any previous value instead of storing.
            let _ = self.client.delete(key);
            return Ok(true);
        };
        self.client
            .set(key, payload, ttl.as_secs() as u32)
            .map_err(|e| Error::storage(format!("memcached set failed: {e}")))?;
        Ok(true)
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.client
            .get::<String>(key)
            .map_err(|e| Error::storage(format!("memcached get failed: {e}")))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.client
            .delete(key)
            .map_err(|e| Error::storage(format!("memcached delete failed: {e}")))?;
        Ok(true)
    }

    async fn clear_all(&self) -> Result<bool> {
        self.client
            .flush()
            .map_err(|e| Error::storage(format!("memcached flush failed: {e}")))?;
        Ok(true)
    }
}

impl std::fmt::Debug for MemcachedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemcachedBackend")
            .field("servers", &self.servers)
            .finish()
    }
}
