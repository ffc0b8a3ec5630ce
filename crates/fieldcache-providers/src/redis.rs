//! Redis distributed backend
//!
//! Every key is written under a fixed prefix so the facade's entries
//! never collide with unrelated uses of the same server. Payloads stay
//! in the facade's text encoding (JSON), so values remain inspectable
//! with ordinary server tooling. TTL is native (`SET` with `EX`).
//!
//! Field tracking does not use the generic JSON index: members are
//! appended to a native server-side list under `<prefix>Field:<name>`,
//! and the whole group is invalidated with a single multi-key `DEL`.

use async_trait::async_trait;
use fieldcache_domain::clock::Clock;
use fieldcache_domain::error::{Error, Result};
use fieldcache_domain::expire::{effective_expiry, remaining_ttl};
use fieldcache_domain::ports::{field_key, BackendKind, CacheBackend};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How long the construction-time liveness probe waits
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisBackendConfig {
    /// Connection URL
    pub url: String,
    /// Prefix applied to every key this backend writes
    pub key_prefix: String,
}

impl Default for RedisBackendConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "fc:".to_string(),
        }
    }
}

/// Redis-backed cache
pub struct RedisBackend {
    client: Client,
    prefix: String,
    clock: Arc<dyn Clock>,
}

impl RedisBackend {
    /// Connect and probe the server; a failed probe is a storage error
    /// the registry turns into a null-backend fallback
    pub async fn connect(config: RedisBackendConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            Error::configuration(format!("invalid redis url `{}`: {e}", config.url))
        })?;
        Self::ping(&client).await?;
        Ok(Self {
            client,
            prefix: config.key_prefix,
            clock,
        })
    }

    /// One-shot liveness probe
    async fn ping(client: &Client) -> Result<()> {
        let mut conn = match tokio::time::timeout(
            PROBE_TIMEOUT,
            client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(Error::storage_with("redis connection failed", e)),
            Err(_) => return Err(Error::storage("redis connection timed out")),
        };

        match tokio::time::timeout(
            PROBE_TIMEOUT,
            ::redis::cmd("PING").query_async::<()>(&mut conn),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::storage_with("redis PING failed", e)),
            Err(_) => Err(Error::storage("redis PING timed out")),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::storage_with("failed to get redis connection", e))
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Redis
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn set_raw(&self, key: &str, payload: &str, expires_at: i64) -> Result<bool> {
        let now = self.clock.now_unix();
        let Some(ttl) = remaining_ttl(expires_at, now) else {
            // Born expired: drop any previous value instead of storing.
            return self.delete(key).await;
        };
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<()> = conn
            .set_ex(self.prefixed(key), payload, ttl.as_secs())
            .await;
        result.map_err(|e| Error::storage_with("redis SET failed", e))?;
        Ok(true)
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(self.prefixed(key))
            .await
            .map_err(|e| Error::storage_with("redis GET failed", e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<()> = conn.del(self.prefixed(key)).await;
        result.map_err(|e| Error::storage_with("redis DEL failed", e))?;
        Ok(true)
    }

    async fn clear_all(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = ::redis::cmd("KEYS")
            .arg(format!("{}*", self.prefix))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::storage_with("redis KEYS failed", e))?;
        if !keys.is_empty() {
            ::redis::cmd("DEL")
                .arg(&keys)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| Error::storage_with("redis DEL failed", e))?;
        }
        Ok(true)
    }

    async fn track_key(&self, field: &str, key: &str, expires_at: i64) -> Result<bool> {
        let expires_at = effective_expiry(expires_at, self.clock.now_unix());
        let list_key = self.prefixed(&field_key(field));
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<()> = conn.rpush(&list_key, key).await;
        result.map_err(|e| Error::storage_with("redis RPUSH failed", e))?;
        // The index ages out with its most recently stored member.
        let result: redis::RedisResult<()> = conn.expire_at(&list_key, expires_at).await;
        result.map_err(|e| Error::storage_with("redis EXPIREAT failed", e))?;
        Ok(true)
    }

    async fn field_members(&self, field: &str) -> Result<Vec<String>> {
        let list_key = self.prefixed(&field_key(field));
        let mut conn = self.connection().await?;
        conn.lrange::<_, Vec<String>>(&list_key, 0, -1)
            .await
            .map_err(|e| Error::storage_with("redis LRANGE failed", e))
    }

    async fn clear_field(&self, field: &str) -> Result<bool> {
        let list_key = self.prefixed(&field_key(field));
        let members = self.field_members(field).await?;
        let mut to_delete: Vec<String> =
            members.iter().map(|member| self.prefixed(member)).collect();
        to_delete.push(list_key);
        let mut conn = self.connection().await?;
        ::redis::cmd("DEL")
            .arg(&to_delete)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::storage_with("redis DEL failed", e))?;
        Ok(true)
    }
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("prefix", &self.prefix)
            .finish()
    }
}
