//! Cache Backend Port
//!
//! The contract every storage backend satisfies, plus the generic field
//! index layered on top of it.
//!
//! ## Field index
//!
//! A field (group) is a named bucket of cache keys that can be
//! invalidated as a unit. The tracked member keys are themselves stored
//! as a cache entry under the reserved key `Field:<name>`, JSON-encoded,
//! through the backend's own `get_raw`/`set_raw` — so the index works on
//! any backend with no native tag concept. The tracked sequence is
//! append-only and duplicate-tolerant; two concurrent writers may lose
//! an append (last writer wins), which under-counts members but never
//! breaks `clear_field` — missing members are tolerated and leaked keys
//! expire on their own TTL.
//!
//! Backends with a native grouping structure (Redis's server-side lists)
//! override the three field methods instead.

use crate::constants::FIELD_PREFIX;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved key under which a field's tracked member keys are stored
pub fn field_key(field: &str) -> String {
    format!("{FIELD_PREFIX}{field}")
}

/// Storage backend variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process shared memory (moka)
    Memory,
    /// Local filesystem
    File,
    /// Redis-backed distributed cache
    Redis,
    /// Memcached server pool
    Memcached,
    /// No-op fallback
    None,
}

impl BackendKind {
    /// Parse a configured kind name; unknown names map to [`BackendKind::None`]
    /// so a misconfigured role degrades to the null backend rather than failing
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "apc" => Self::Memory,
            "file" => Self::File,
            "redis" => Self::Redis,
            "memcached" | "mem" => Self::Memcached,
            _ => Self::None,
        }
    }

    /// Canonical name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Redis => "redis",
            Self::Memcached => "memcached",
            Self::None => "none",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache Backend Port
///
/// A miss is `Ok(None)` — a type-level sentinel that cannot collide with
/// any stored payload, including cached `false`, `0`, `""` or `null`.
/// Callers must never test for misses by decoding and comparing values.
///
/// Expiry handling is split by capability: backends with native TTL
/// convert the absolute deadline to relative seconds at write time (a
/// deadline already in the past stores nothing — the entry is born
/// expired); TTL-less backends persist the absolute deadline beside the
/// payload and lazily check-and-evict on read, physically removing the
/// expired storage before reporting the miss.
#[async_trait]
pub trait CacheBackend: Send + Sync + fmt::Debug {
    /// Which backend variant this is
    fn kind(&self) -> BackendKind;

    /// Whether the underlying mechanism is actually usable; the outcome
    /// of the construction-time capability probe, never re-checked per
    /// call. The null backend reports `false` while still accepting
    /// every operation as a silent success.
    fn enabled(&self) -> bool;

    /// Store a payload under `key` until `expires_at` (unix seconds).
    /// An `expires_at` of `0` means long-lived (see
    /// [`crate::expire::effective_expiry`]).
    async fn set_raw(&self, key: &str, payload: &str, expires_at: i64) -> Result<bool>;

    /// Fetch the payload stored under `key`, or `None` on miss/expiry
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Remove `key`. Idempotent: reports `true` whether or not the key
    /// existed. Exception: the filesystem backend reports `false` for
    /// "did not exist"; callers treat both outcomes as success.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every entry this backend owns, best-effort. Partial
    /// failure may leave orphaned storage; callers must not assume
    /// atomicity.
    async fn clear_all(&self) -> Result<bool>;

    /// Record `key` as a member of `field`, giving the index entry the
    /// same expiry as the member just stored.
    async fn track_key(&self, field: &str, key: &str, expires_at: i64) -> Result<bool> {
        let index_key = field_key(field);
        let mut members = match self.get_raw(&index_key).await? {
            Some(raw) => decode_members(&index_key, &raw),
            None => Vec::new(),
        };
        members.push(key.to_string());
        let payload = serde_json::to_string(&members)?;
        self.set_raw(&index_key, &payload, expires_at).await
    }

    /// Keys currently tracked under `field` (duplicates possible);
    /// empty when the field was never populated or already cleared
    async fn field_members(&self, field: &str) -> Result<Vec<String>> {
        let index_key = field_key(field);
        match self.get_raw(&index_key).await? {
            Some(raw) => Ok(decode_members(&index_key, &raw)),
            None => Ok(Vec::new()),
        }
    }

    /// Delete every member tracked under `field`, then the index entry
    /// itself. Per-member failures are tolerated; a field with no index
    /// entry is a vacuous success.
    async fn clear_field(&self, field: &str) -> Result<bool> {
        let members = self.field_members(field).await?;
        for member in &members {
            if let Err(error) = self.delete(member).await {
                tracing::warn!(key = %member, %error, "failed to drop tracked cache entry");
            }
        }
        self.delete(&field_key(field)).await?;
        Ok(true)
    }
}

/// Decode a tracked member list, treating corrupt index payloads as empty
fn decode_members(index_key: &str, raw: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(members) => members,
        Err(error) => {
            tracing::warn!(key = %index_key, %error, "corrupt field index entry, treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parsing_is_case_and_whitespace_insensitive() {
        assert_eq!(BackendKind::parse(" File "), BackendKind::File);
        assert_eq!(BackendKind::parse("REDIS"), BackendKind::Redis);
        assert_eq!(BackendKind::parse("mem"), BackendKind::Memcached);
        assert_eq!(BackendKind::parse("apc"), BackendKind::Memory);
        assert_eq!(BackendKind::parse("bogus"), BackendKind::None);
        assert_eq!(BackendKind::parse(""), BackendKind::None);
    }

    #[test]
    fn field_keys_use_the_reserved_prefix() {
        assert_eq!(field_key("users"), "Field:users");
    }

    #[test]
    fn corrupt_index_payloads_decode_to_empty() {
        assert!(decode_members("Field:users", "not json").is_empty());
        assert_eq!(
            decode_members("Field:users", r#"["k1","k2"]"#),
            vec!["k1".to_string(), "k2".to_string()]
        );
    }
}
