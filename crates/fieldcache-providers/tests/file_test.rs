//! File backend tests
//!
//! Expiry here is fully deterministic: the backend checks deadlines
//! against the injected clock, so tests drive time by hand and assert
//! on the physical storage artifacts.

use fieldcache_domain::clock::ManualClock;
use fieldcache_domain::ports::CacheBackend;
use fieldcache_providers::file::{FileBackend, FileBackendConfig};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const NOW: i64 = 1_700_000_000;

fn backend(dir: &Path, clock: Arc<ManualClock>) -> FileBackend {
    FileBackend::new(
        FileBackendConfig {
            dir: dir.to_path_buf(),
        },
        clock,
    )
    .unwrap()
}

#[tokio::test]
async fn set_then_get_round_trips_with_sidecar_files() {
    let dir = TempDir::new().unwrap();
    let backend = backend(dir.path(), Arc::new(ManualClock::new(NOW)));

    assert!(backend.set_raw("report_42", "\"v1\"", NOW + 60).await.unwrap());
    assert_eq!(
        backend.get_raw("report_42").await.unwrap(),
        Some("\"v1\"".to_string())
    );

    // Payload plus a human-readable copy of the original key.
    assert!(dir.path().join("report_42.cache").exists());
    let key_copy = std::fs::read_to_string(dir.path().join("report_42.key")).unwrap();
    assert_eq!(key_copy, "report_42");
}

#[tokio::test]
async fn unsafe_keys_are_hashed_but_still_resolve() {
    let dir = TempDir::new().unwrap();
    let backend = backend(dir.path(), Arc::new(ManualClock::new(NOW)));

    let key = "user:42/profile?lang=en";
    backend.set_raw(key, "\"v1\"", NOW + 60).await.unwrap();
    assert_eq!(
        backend.get_raw(key).await.unwrap(),
        Some("\"v1\"".to_string())
    );

    // No file is named after the raw key; the key copy preserves it.
    assert!(!dir.path().join(format!("{key}.cache")).exists());
    let copies: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| {
            let path = entry.unwrap().path();
            (path.extension().is_some_and(|ext| ext == "key"))
                .then(|| std::fs::read_to_string(path).unwrap())
        })
        .collect();
    assert_eq!(copies, vec![key.to_string()]);
}

#[tokio::test]
async fn expired_entries_are_physically_evicted_on_read() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(NOW));
    let backend = backend(dir.path(), clock.clone());

    backend.set_raw("k1", "\"v1\"", NOW + 10).await.unwrap();
    clock.advance(11);

    assert_eq!(backend.get_raw("k1").await.unwrap(), None);
    assert!(!dir.path().join("k1.cache").exists());
    assert!(!dir.path().join("k1.key").exists());
    // The manifest row is gone too: a later read is still a plain miss.
    assert_eq!(backend.get_raw("k1").await.unwrap(), None);
}

#[tokio::test]
async fn already_past_expiry_misses_on_the_first_read() {
    let dir = TempDir::new().unwrap();
    let backend = backend(dir.path(), Arc::new(ManualClock::new(NOW)));

    backend.set_raw("k1", "\"v1\"", NOW - 1).await.unwrap();
    assert_eq!(backend.get_raw("k1").await.unwrap(), None);
    assert!(!dir.path().join("k1.cache").exists());
}

#[tokio::test]
async fn delete_reports_whether_the_key_existed() {
    let dir = TempDir::new().unwrap();
    let backend = backend(dir.path(), Arc::new(ManualClock::new(NOW)));

    backend.set_raw("k1", "\"v1\"", NOW + 60).await.unwrap();
    assert!(backend.delete("k1").await.unwrap());
    assert!(!backend.delete("k1").await.unwrap());
    assert_eq!(backend.get_raw("k1").await.unwrap(), None);
    assert!(!dir.path().join("k1.cache").exists());
}

#[tokio::test]
async fn clear_all_removes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let backend = backend(dir.path(), Arc::new(ManualClock::new(NOW)));

    backend.set_raw("k1", "\"v1\"", NOW + 60).await.unwrap();
    backend.set_raw("k2", "\"v2\"", NOW + 60).await.unwrap();
    assert!(backend.clear_all().await.unwrap());

    assert_eq!(backend.get_raw("k1").await.unwrap(), None);
    assert_eq!(backend.get_raw("k2").await.unwrap(), None);
    assert!(!dir.path().join("k1.cache").exists());
    assert!(!dir.path().join("k2.cache").exists());
    assert!(!dir.path().join("manifest.cache").exists());
}

#[tokio::test]
async fn field_index_survives_on_disk() {
    let dir = TempDir::new().unwrap();
    let backend = backend(dir.path(), Arc::new(ManualClock::new(NOW)));

    backend.set_raw("k1", "\"v1\"", NOW + 60).await.unwrap();
    backend.track_key("users", "k1", NOW + 60).await.unwrap();
    backend.set_raw("k2", "\"v2\"", NOW + 60).await.unwrap();
    backend.track_key("users", "k2", NOW + 60).await.unwrap();

    assert_eq!(
        backend.field_members("users").await.unwrap(),
        vec!["k1".to_string(), "k2".to_string()]
    );
    assert!(backend.clear_field("users").await.unwrap());
    assert_eq!(backend.get_raw("k1").await.unwrap(), None);
    assert_eq!(backend.get_raw("k2").await.unwrap(), None);
}
