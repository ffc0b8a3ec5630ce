//! Local filesystem backend
//!
//! Each entry is stored as two sibling files in the cache directory: the
//! payload (`<token>.cache`) and a human-readable copy of the original
//! key (`<token>.key`) for diagnosability. `<token>` is the key itself
//! when it is already filesystem-safe, otherwise a hash of it.
//!
//! The filesystem has no native TTL, so a single JSON manifest
//! (`manifest.cache`) maps token to absolute expiry and is consulted on
//! every read; expired entries are physically evicted at that point. The
//! manifest is a shared mutable document: its read-modify-write span is
//! guarded by an in-process mutex plus an exclusive advisory file lock
//! so concurrent processes cannot lose updates.

use async_trait::async_trait;
use fieldcache_domain::clock::Clock;
use fieldcache_domain::error::Result;
use fieldcache_domain::expire::effective_expiry;
use fieldcache_domain::ports::{BackendKind, CacheBackend};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const MANIFEST_NAME: &str = "manifest.cache";
const PAYLOAD_EXT: &str = "cache";
const KEY_COPY_EXT: &str = "key";

/// File backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// Directory holding payloads, key copies, and the manifest
    pub dir: PathBuf,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./cache"),
        }
    }
}

/// Filesystem-backed cache
pub struct FileBackend {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    // Serializes manifest read-modify-write spans within this process;
    // the fs2 lock covers other processes.
    manifest_guard: Mutex<()>,
}

impl FileBackend {
    /// Create a new file backend, creating the cache directory if needed
    pub fn new(config: FileBackendConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        fs::create_dir_all(&config.dir)?;
        Ok(Self {
            dir: config.dir,
            clock,
            manifest_guard: Mutex::new(()),
        })
    }

    /// Filesystem-safe token for a key: the key itself when it is plain
    /// `\w+`, otherwise a hash of it
    fn token(key: &str) -> String {
        let is_safe =
            !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if is_safe {
            key.to_string()
        } else {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            format!("{:x}", hasher.finish())
        }
    }

    fn payload_path(&self, token: &str) -> PathBuf {
        self.dir.join(format!("{token}.{PAYLOAD_EXT}"))
    }

    fn key_copy_path(&self, token: &str) -> PathBuf {
        self.dir.join(format!("{token}.{KEY_COPY_EXT}"))
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_NAME)
    }

    /// Read the manifest under a shared lock; a missing manifest is empty
    fn read_manifest(&self) -> Result<HashMap<String, i64>> {
        let path = self.manifest_path();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(error) => return Err(error.into()),
        };
        file.lock_shared()?;
        let mut contents = String::new();
        (&file).read_to_string(&mut contents)?;
        Ok(parse_manifest(&path, &contents))
    }

    /// Run `mutate` over the manifest while holding an exclusive
    /// advisory lock across the whole read-modify-write span
    fn with_manifest<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut HashMap<String, i64>) -> R,
    {
        let path = self.manifest_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()?;
        let mut contents = String::new();
        (&file).read_to_string(&mut contents)?;
        let mut manifest = parse_manifest(&path, &contents);

        let outcome = mutate(&mut manifest);

        let encoded = serde_json::to_string(&manifest)?;
        (&file).seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        (&file).write_all(encoded.as_bytes())?;
        Ok(outcome)
    }

    /// Remove an entry's payload and key-copy files, best-effort
    fn remove_entry_files(&self, token: &str) {
        for path in [self.payload_path(token), self.key_copy_path(token)] {
            if let Err(error) = fs::remove_file(&path) {
                if error.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), %error, "failed to remove cache file");
                }
            }
        }
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn set_raw(&self, key: &str, payload: &str, expires_at: i64) -> Result<bool> {
        let expires_at = effective_expiry(expires_at, self.clock.now_unix());
        let token = Self::token(key);
        let _guard = self.manifest_guard.lock().await;
        fs::write(self.payload_path(&token), payload)?;
        fs::write(self.key_copy_path(&token), key)?;
        self.with_manifest(|manifest| {
            manifest.insert(token.clone(), expires_at);
        })?;
        Ok(true)
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now_unix();
        let token = Self::token(key);
        let _guard = self.manifest_guard.lock().await;

        let Some(expires_at) = self.read_manifest()?.get(&token).copied() else {
            return Ok(None);
        };
        if expires_at < now {
            // Lazy eviction: drop the storage before reporting the miss.
            self.with_manifest(|manifest| {
                manifest.remove(&token);
            })?;
            self.remove_entry_files(&token);
            return Ok(None);
        }

        match fs::read_to_string(self.payload_path(&token)) {
            Ok(payload) => Ok(Some(payload)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let token = Self::token(key);
        let _guard = self.manifest_guard.lock().await;
        let existed = self.with_manifest(|manifest| manifest.remove(&token).is_some())?;
        if !existed {
            return Ok(false);
        }
        self.remove_entry_files(&token);
        Ok(true)
    }

    async fn clear_all(&self) -> Result<bool> {
        let _guard = self.manifest_guard.lock().await;
        let tokens = self.with_manifest(|manifest| {
            let tokens: Vec<String> = manifest.keys().cloned().collect();
            manifest.clear();
            tokens
        })?;
        for token in &tokens {
            self.remove_entry_files(token);
        }
        if let Err(error) = fs::remove_file(self.manifest_path()) {
            if error.kind() != ErrorKind::NotFound {
                tracing::warn!(%error, "failed to remove cache manifest");
            }
        }
        Ok(true)
    }
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("dir", &self.dir)
            .finish()
    }
}

/// Decode the manifest, treating a corrupt document as empty
fn parse_manifest(path: &Path, contents: &str) -> HashMap<String, i64> {
    if contents.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str(contents) {
        Ok(manifest) => manifest,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "corrupt cache manifest, starting empty");
            HashMap::new()
        }
    }
}
