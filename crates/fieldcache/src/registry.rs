//! Backend registry
//!
//! Resolves configuration roles to backend handles. One backend is
//! constructed per normalized role string, lazily, and lives for the
//! registry's lifetime; repeated resolutions return the identical
//! handle. Construction happens under the registry's mutex, so at most
//! one instance per role is ever built even under concurrent
//! resolution.
//!
//! Availability is decided here, once: a backend whose runtime
//! capability is missing (server unreachable, directory unusable) is
//! replaced by the null backend with a warning, and resolution still
//! succeeds. Only missing required configuration is fatal.

use crate::cache::Cache;
use crate::config::CacheSettings;
use fieldcache_domain::clock::{Clock, SystemClock};
use fieldcache_domain::error::{Error, Result};
use fieldcache_domain::ports::{BackendKind, CacheBackend};
use fieldcache_providers::{
    FileBackend, MemcachedBackend, MemoryBackend, NullBackend, RedisBackend,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Logical configuration roles mapped to backend kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheRole {
    /// Rendered-page cache
    Page,
    /// Query/data cache
    Data,
    /// Cache the application requires to exist (file-backed by default)
    Required,
}

impl CacheRole {
    /// Every known role, in the order the global flush visits them
    pub const ALL: [CacheRole; 3] = [CacheRole::Page, CacheRole::Data, CacheRole::Required];

    /// Parse a role name, case- and whitespace-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "page" => Some(Self::Page),
            "data" => Some(Self::Data),
            "required" | "must" => Some(Self::Required),
            _ => None,
        }
    }

    /// Canonical name of this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Data => "data",
            Self::Required => "required",
        }
    }
}

/// Role-keyed backend registry
pub struct CacheRegistry {
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
    backends: Mutex<HashMap<String, Arc<dyn CacheBackend>>>,
}

impl CacheRegistry {
    /// Create a registry over the given settings with the system clock
    pub fn new(settings: CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create a registry with an injected clock
    pub fn with_clock(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            backends: Mutex::new(HashMap::new()),
        }
    }

    /// Create a registry from file/environment configuration
    pub fn from_config() -> Result<Self> {
        Ok(Self::new(CacheSettings::load()?))
    }

    /// Resolve a role to a facade. Never fails for availability
    /// reasons; unknown roles get the null backend.
    pub async fn resolve(&self, role: &str) -> Result<Cache> {
        let backend = self.backend_for_role(role).await?;
        Ok(Cache::new(backend, self.clock.clone()))
    }

    /// Resolve a role to its backend singleton
    pub async fn backend_for_role(&self, role: &str) -> Result<Arc<dyn CacheBackend>> {
        let normalized = role.trim().to_ascii_lowercase();
        let mut backends = self.backends.lock().await;
        if let Some(existing) = backends.get(&normalized) {
            return Ok(existing.clone());
        }
        let kind = match CacheRole::parse(&normalized) {
            Some(known) => self.settings.kind_for(known),
            None => BackendKind::None,
        };
        let backend = self.build(kind).await?;
        tracing::info!(role = %normalized, backend = %backend.kind(), "cache backend resolved");
        backends.insert(normalized, backend.clone());
        Ok(backend)
    }

    /// Construct a backend of the given kind directly, bypassing role
    /// indirection and the singleton registry
    pub async fn backend_by_kind(&self, kind: BackendKind) -> Result<Arc<dyn CacheBackend>> {
        self.build(kind).await
    }

    /// Flush every known role's backend, best-effort. Kinds shared
    /// across roles are flushed more than once; every variant's
    /// `clear_all` is idempotent, so that is safe.
    pub async fn clear_all(&self) -> Result<()> {
        for role in CacheRole::ALL {
            let cache = self.resolve(role.as_str()).await?;
            if let Err(error) = cache.clear(None).await {
                tracing::warn!(role = role.as_str(), %error, "cache flush failed");
            }
        }
        Ok(())
    }

    async fn build(&self, kind: BackendKind) -> Result<Arc<dyn CacheBackend>> {
        let backend: Arc<dyn CacheBackend> = match kind {
            BackendKind::Memory => Arc::new(MemoryBackend::new(
                self.settings.memory.clone(),
                self.clock.clone(),
            )),
            BackendKind::File => {
                match FileBackend::new(self.settings.file.clone(), self.clock.clone()) {
                    Ok(backend) => Arc::new(backend),
                    Err(error) => return Ok(self.fallback(kind, &error)),
                }
            }
            BackendKind::Redis => {
                match RedisBackend::connect(self.settings.redis.clone(), self.clock.clone()).await
                {
                    Ok(backend) => Arc::new(backend),
                    Err(error) if error.is_configuration() => return Err(error),
                    Err(error) => return Ok(self.fallback(kind, &error)),
                }
            }
            BackendKind::Memcached => {
                match MemcachedBackend::connect(self.settings.memcached.clone(), self.clock.clone())
                {
                    Ok(backend) => Arc::new(backend),
                    Err(error) if error.is_configuration() => return Err(error),
                    Err(error) => return Ok(self.fallback(kind, &error)),
                }
            }
            BackendKind::None => Arc::new(NullBackend::new()),
        };
        Ok(backend)
    }

    fn fallback(&self, requested: BackendKind, error: &Error) -> Arc<dyn CacheBackend> {
        tracing::warn!(requested = %requested, %error, "cache backend unavailable, using null backend");
        Arc::new(NullBackend::new())
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("settings", &self.settings)
            .finish()
    }
}
