//! # fieldcache - Backend Implementations
//!
//! Storage backends implementing the [`CacheBackend`] port from
//! `fieldcache-domain`.
//!
//! | Backend | Kind | Expiry | Group tracking |
//! |---------|------|--------|----------------|
//! | [`MemoryBackend`] | In-process | Native (per-entry TTL) | Generic field index |
//! | [`FileBackend`] | Local filesystem | Manifest + lazy eviction | Generic field index |
//! | [`RedisBackend`] | Distributed KV | Native (`SET EX`) | Native server-side list |
//! | [`MemcachedBackend`] | Networked object cache | Native (relative TTL) | Generic field index |
//! | [`NullBackend`] | No-op fallback | n/a | n/a |
//!
//! Heavy backends are feature-gated (`memory`, `redis`, `memcached`, all
//! on by default); the file and null backends are always available.

// Re-export domain types commonly used with backends
pub use fieldcache_domain::error::{Error, Result};
pub use fieldcache_domain::ports::{BackendKind, CacheBackend};

/// In-process shared-memory backend
#[cfg(feature = "memory")]
pub mod memory;

/// Local filesystem backend
pub mod file;

/// Redis-backed distributed backend
#[cfg(feature = "redis")]
pub mod redis;

/// Memcached server-pool backend
#[cfg(feature = "memcached")]
pub mod memcached;

/// No-op fallback backend
pub mod null;

#[cfg(feature = "memory")]
pub use memory::{MemoryBackend, MemoryBackendConfig};

pub use file::{FileBackend, FileBackendConfig};

#[cfg(feature = "redis")]
pub use redis::{RedisBackend, RedisBackendConfig};

#[cfg(feature = "memcached")]
pub use memcached::{MemcachedBackend, MemcachedBackendConfig};

pub use null::NullBackend;
