//! # fieldcache
//!
//! A pluggable caching facade: one typed interface for storing,
//! retrieving, expiring, and bulk-invalidating key/value data across
//! interchangeable storage backends.
//!
//! Every stored key belongs to a named **field** (group); clearing a
//! field invalidates all of its members at once, even on backends with
//! no native tag concept. Backends are selected per configuration
//! **role** (`page`, `data`, `required`) by the [`CacheRegistry`], which
//! hands out one singleton backend per role and silently substitutes
//! the null backend when a configured backend's runtime capability is
//! missing — callers always get a working handle.
//!
//! | Backend | Storage | TTL |
//! |---------|---------|-----|
//! | memory | In-process (moka) | Native, per entry |
//! | file | Local filesystem | Manifest + lazy eviction |
//! | redis | Redis server | Native (`SET EX`), native list group index |
//! | memcached | Memcached pool | Native, relative seconds |
//! | none | Nothing | n/a |
//!
//! ## Example
//!
//! ```ignore
//! use fieldcache::{CacheRegistry, CacheSettings, Expire};
//!
//! let registry = CacheRegistry::new(CacheSettings::load()?);
//! let cache = registry.resolve("data").await?;
//!
//! cache.set("users", "user:42", &user, Expire::Default).await?;
//! let user: Option<User> = cache.get("user:42").await?;
//!
//! // Invalidate every key stored under the "users" field.
//! cache.clear(Some("users")).await?;
//! ```

/// Typed caching facade
pub mod cache;

/// Settings structs and the figment loader
pub mod config;

/// Role resolution and backend singletons
pub mod registry;

pub use cache::Cache;
pub use config::{CacheSettings, RoleSettings};
pub use registry::{CacheRegistry, CacheRole};

// Re-export the domain surface callers need
pub use fieldcache_domain::clock::{Clock, ManualClock, SystemClock};
pub use fieldcache_domain::error::{Error, Result};
pub use fieldcache_domain::expire::Expire;
pub use fieldcache_domain::ports::{BackendKind, CacheBackend};

// Re-export backend types for direct construction
pub use fieldcache_providers::{
    FileBackend, FileBackendConfig, MemcachedBackend, MemcachedBackendConfig, MemoryBackend,
    MemoryBackendConfig, NullBackend, RedisBackend, RedisBackendConfig,
};
