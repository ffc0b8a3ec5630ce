//! Null backend
//!
//! The fallback when no cache layer is configured or a configured
//! backend's runtime capability is missing. Accepts every operation as a
//! silent success, stores nothing, always misses on read — calling code
//! stays branch-free. The one honest answer it gives is
//! `enabled() == false`.

use async_trait::async_trait;
use fieldcache_domain::error::Result;
use fieldcache_domain::ports::{BackendKind, CacheBackend};

/// No-op backend that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl NullBackend {
    /// Create a new null backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheBackend for NullBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::None
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn set_raw(&self, _key: &str, _payload: &str, _expires_at: i64) -> Result<bool> {
        Ok(true)
    }

    async fn get_raw(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(true)
    }

    async fn clear_all(&self) -> Result<bool> {
        Ok(true)
    }
}
