//! Client-side key-value storage backends.
//!
//! DESIGN
//! ======
//! Two storage areas mirror the browser split between durable and
//! per-session storage: `FileStore` survives restarts, `MemoryStore` lives
//! only as long as the process. Writes are best-effort: a failure is logged
//! and swallowed so an unwritable state directory never breaks a login.

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const TOKEN_TYPE_KEY: &str = "token_type";
const STORE_FILE_NAME: &str = "storage.json";

/// A string key-value storage area.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// MEMORY
// =============================================================================

/// Ephemeral in-process storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Durable storage backed by a JSON object on disk.
///
/// A missing or corrupt file reads as empty; the next write replaces it.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store rooted at `dir/storage.json`. The directory is created lazily.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::at_path(dir.join(STORE_FILE_NAME))
    }

    #[must_use]
    pub fn at_path(path: PathBuf) -> Self {
        Self { path, lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let Ok(text) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "storage file unreadable, treating as empty");
            BTreeMap::new()
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "storage directory unavailable");
                return;
            }
        }
        let json = match serde_json::to_string_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "storage encode failed");
                return;
            }
        };
        if let Err(e) = write_private(&self.path, json.as_bytes()) {
            tracing::warn!(path = %self.path.display(), error = %e, "storage write failed");
        }
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) {
        let Ok(_guard) = self.lock.lock() else {
            return;
        };
        let mut entries = self.read_all();
        if f(&mut entries) {
            self.write_all(&entries);
        }
    }
}

/// Write `bytes` to `path`, readable by the owner only on Unix.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // `mode` only applies on creation; tighten files left by older runs.
        if path.exists() {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
            true
        });
    }

    fn remove(&self, key: &str) {
        self.update(|entries| entries.remove(key).is_some());
    }
}

// =============================================================================
// TOKEN STORAGE
// =============================================================================

/// Bearer token as persisted by a previous login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredToken {
    pub access_token: String,
    pub token_type: Option<String>,
}

/// The pair of storage areas used for the bearer token.
#[derive(Clone)]
pub struct TokenStorage {
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
}

impl TokenStorage {
    #[must_use]
    pub fn new(durable: Arc<dyn KeyValueStore>, ephemeral: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, ephemeral }
    }

    /// Two fresh in-memory areas. Nothing survives the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    #[must_use]
    pub fn durable(&self) -> &Arc<dyn KeyValueStore> {
        &self.durable
    }

    #[must_use]
    pub fn ephemeral(&self) -> &Arc<dyn KeyValueStore> {
        &self.ephemeral
    }

    /// Read the persisted token, preferring durable storage.
    #[must_use]
    pub fn load(&self) -> Option<StoredToken> {
        [&self.durable, &self.ephemeral].into_iter().find_map(|store| {
            let access_token = store.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())?;
            Some(StoredToken { access_token, token_type: store.get(TOKEN_TYPE_KEY) })
        })
    }

    /// Write the token to durable storage when `remember`, else ephemeral.
    pub fn persist(&self, access_token: &str, token_type: &str, remember: bool) {
        let store = if remember { &self.durable } else { &self.ephemeral };
        store.set(ACCESS_TOKEN_KEY, access_token);
        store.set(TOKEN_TYPE_KEY, token_type);
    }

    /// Remove token entries from both areas.
    pub fn clear(&self) {
        for store in [&self.durable, &self.ephemeral] {
            store.remove(ACCESS_TOKEN_KEY);
            store.remove(TOKEN_TYPE_KEY);
        }
    }
}
