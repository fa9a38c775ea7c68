//! Token persistence: a key-value capability plus the session's token store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

/// Durable key-value capability standing in for the browsing context's
/// persistent storage. A medium that cannot persist skips persistence and
/// logs; it never surfaces an error.
pub trait PersistentStore: Send + Sync + Clone + 'static {
    /// Value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str);
    /// Removes the entry under `key`.
    fn remove(&self, key: &str);
}

/// Process-lifetime store backed by a concurrent map.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store for hosts with no persistence at all: reads miss, writes vanish.
#[derive(Clone, Default)]
pub struct NoopStore;

impl PersistentStore for NoopStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) {}

    fn remove(&self, _key: &str) {}
}

/// Durable store for native hosts: a JSON object on disk. I/O failures
/// degrade to in-memory behavior with a warning.
#[derive(Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store persisting to the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> HashMap<String, String> {
        match std::fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) {
        match serde_json::to_vec(map) {
            Ok(bytes) => {
                if let Err(err) = std::fs::write(&self.path, bytes) {
                    warn!(path = %self.path.display(), %err, "token persistence skipped");
                }
            }
            Err(err) => warn!(%err, "token serialization skipped"),
        }
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map);
        }
    }
}

/// Loads, saves and clears the session's bearer token under the configured
/// storage key. Without a key, every operation is a no-op and the token
/// lives only in the session's memory.
#[derive(Debug, Clone)]
pub struct TokenStore<S: PersistentStore> {
    store: S,
    key: Option<String>,
}

impl<S: PersistentStore> TokenStore<S> {
    /// Wraps `store`, persisting under `key` when one is configured.
    pub fn new(store: S, key: Option<String>) -> Self {
        Self { store, key }
    }

    /// Previously persisted token, if any.
    pub fn load(&self) -> Option<String> {
        self.key.as_deref().and_then(|key| self.store.get(key))
    }

    /// Persists `token`.
    pub fn save(&self, token: &str) {
        if let Some(key) = &self.key {
            self.store.set(key, token);
        }
    }

    /// Drops the persisted token.
    pub fn clear(&self) {
        if let Some(key) = &self.key {
            self.store.remove(key);
        }
    }
}
