//! Registry tests
//!
//! Role resolution, singleton identity, fallback policy, and the
//! global flush. Network backends are only exercised against
//! unreachable endpoints: availability fallback must not depend on a
//! live server.

use fieldcache::{
    BackendKind, CacheRegistry, CacheSettings, Expire, FileBackendConfig,
    MemcachedBackendConfig, RedisBackendConfig, RoleSettings,
};
use std::sync::Arc;
use tempfile::TempDir;

fn settings_with_roles(page: &str, data: &str, required: &str) -> CacheSettings {
    CacheSettings {
        roles: RoleSettings {
            page: page.to_string(),
            data: data.to_string(),
            required: required.to_string(),
        },
        ..CacheSettings::default()
    }
}

#[tokio::test]
async fn the_same_role_resolves_to_the_identical_handle() {
    let registry = CacheRegistry::new(settings_with_roles("none", "memory", "none"));

    let first = registry.resolve("data").await.unwrap();
    let second = registry.resolve(" Data ").await.unwrap();
    assert!(Arc::ptr_eq(&first.backend(), &second.backend()));
}

#[tokio::test]
async fn distinct_roles_get_distinct_handles_even_for_the_same_kind() {
    let registry = CacheRegistry::new(settings_with_roles("memory", "memory", "none"));

    let page = registry.resolve("page").await.unwrap();
    let data = registry.resolve("data").await.unwrap();
    assert_eq!(page.backend().kind(), BackendKind::Memory);
    assert_eq!(data.backend().kind(), BackendKind::Memory);
    assert!(!Arc::ptr_eq(&page.backend(), &data.backend()));
}

#[tokio::test]
async fn unknown_roles_get_the_null_backend() {
    let registry = CacheRegistry::new(CacheSettings::default());

    let cache = registry.resolve("sessions").await.unwrap();
    assert_eq!(cache.backend().kind(), BackendKind::None);
    assert!(!cache.enabled());
    // Everything still succeeds trivially.
    assert!(cache.set("users", "k1", &1u32, Expire::Default).await.unwrap());
    assert_eq!(cache.get::<u32>("k1").await.unwrap(), None);
}

#[tokio::test]
async fn an_unreachable_redis_falls_back_to_the_null_backend() {
    let mut settings = settings_with_roles("none", "redis", "none");
    settings.redis = RedisBackendConfig {
        url: "redis://127.0.0.1:1".to_string(),
        ..RedisBackendConfig::default()
    };
    let registry = CacheRegistry::new(settings);

    let cache = registry.resolve("data").await.unwrap();
    assert_eq!(cache.backend().kind(), BackendKind::None);
    assert!(!cache.enabled());
    assert!(cache.set("users", "k1", &1u32, Expire::Default).await.unwrap());
    assert_eq!(cache.get::<u32>("k1").await.unwrap(), None);
}

#[tokio::test]
async fn a_memcached_role_without_servers_fails_construction_loudly() {
    let mut settings = settings_with_roles("none", "memcached", "none");
    settings.memcached = MemcachedBackendConfig::default();
    let registry = CacheRegistry::new(settings);

    let err = registry.resolve("data").await.unwrap_err();
    assert!(err.is_configuration());
}

#[tokio::test]
async fn backend_by_kind_bypasses_the_singleton_registry() {
    let registry = CacheRegistry::new(CacheSettings::default());

    let first = registry.backend_by_kind(BackendKind::Memory).await.unwrap();
    let second = registry.backend_by_kind(BackendKind::Memory).await.unwrap();
    assert_eq!(first.kind(), BackendKind::Memory);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn clear_all_flushes_every_known_role() {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_with_roles("memory", "file", "none");
    settings.file = FileBackendConfig {
        dir: dir.path().to_path_buf(),
    };
    let registry = CacheRegistry::new(settings);

    let page = registry.resolve("page").await.unwrap();
    let data = registry.resolve("data").await.unwrap();
    page.set("a", "k1", &1u32, Expire::Default).await.unwrap();
    data.set("b", "k2", &2u32, Expire::Default).await.unwrap();

    registry.clear_all().await.unwrap();

    assert_eq!(page.get::<u32>("k1").await.unwrap(), None);
    assert_eq!(data.get::<u32>("k2").await.unwrap(), None);
}

#[tokio::test]
async fn settings_load_from_a_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fieldcache.toml");
    std::fs::write(
        &path,
        r#"
[roles]
data = "memory"

[memory]
max_capacity = 500

[redis]
url = "redis://cache.internal:6379"
"#,
    )
    .unwrap();

    let settings = CacheSettings::load_from(&path).unwrap();
    assert_eq!(settings.roles.data, "memory");
    assert_eq!(settings.roles.required, "file"); // default survives the merge
    assert_eq!(settings.memory.max_capacity, 500);
    assert_eq!(settings.redis.url, "redis://cache.internal:6379");
    assert_eq!(settings.redis.key_prefix, "fc:");
}
