//! Cache configuration
//!
//! Settings are merged from three sources, later overriding earlier:
//! defaults, a TOML file (`fieldcache.toml` by default), and
//! `FIELDCACHE_`-prefixed environment variables with `__` separating
//! nested keys (e.g. `FIELDCACHE_ROLES__DATA=redis`).

use crate::registry::CacheRole;
use fieldcache_domain::error::{Error, Result};
use fieldcache_domain::ports::BackendKind;
use fieldcache_providers::{FileBackendConfig, MemcachedBackendConfig, MemoryBackendConfig, RedisBackendConfig};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "fieldcache.toml";

/// Environment variable prefix
pub const CONFIG_ENV_PREFIX: &str = "FIELDCACHE_";

/// Backend kind configured per role
///
/// Kinds are plain strings (`none`, `file`, `redis`, `memcached`,
/// `memory`) so a typo degrades to the null backend instead of failing
/// configuration loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSettings {
    /// Backend kind for the page cache role
    pub page: String,
    /// Backend kind for the data cache role
    pub data: String,
    /// Backend kind for the required cache role
    pub required: String,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            page: "none".to_string(),
            data: "none".to_string(),
            required: "file".to_string(),
        }
    }
}

/// Full cache settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Role to backend-kind mappings
    pub roles: RoleSettings,
    /// Memory backend settings
    pub memory: MemoryBackendConfig,
    /// File backend settings
    pub file: FileBackendConfig,
    /// Redis backend settings
    pub redis: RedisBackendConfig,
    /// Memcached backend settings
    pub memcached: MemcachedBackendConfig,
}

impl CacheSettings {
    /// Load settings from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings merging defaults, the given TOML file (if present),
    /// and prefixed environment variables
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(CONFIG_ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| Error::configuration(format!("failed to load cache settings: {e}")))
    }

    /// The backend kind configured for a role
    pub fn kind_for(&self, role: CacheRole) -> BackendKind {
        let raw = match role {
            CacheRole::Page => &self.roles.page,
            CacheRole::Data => &self.roles.data,
            CacheRole::Required => &self.roles.required,
        };
        BackendKind::parse(raw)
    }
}
