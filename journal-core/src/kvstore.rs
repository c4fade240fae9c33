//! Key-value persistence seam.
//!
//! Progress maps, streak state, and feedback history are stored as
//! string-keyed JSON blobs behind this trait, so the composition root
//! decides where they live and tests can swap in memory.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

/// Errors from key-value store operations.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed JSON blob storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a value by key; None when the key has never been set.
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError>;

    /// Store a value under a key, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), KvError>;
}

/// File-backed store: one JSON file per key under a directory.
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{sanitized}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(&value)?;
        fs::write(self.path_for(key), content).await?;
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryKvStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryKvStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, KvError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), KvError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryKvStore::new();
        assert!(store.get("missing").await.unwrap().is_none());

        store.set("a", json!({"n": 1})).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!({"n": 1})));

        store.set("a", json!({"n": 2})).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!({"n": 2})));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileKvStore::new(dir.path());

        assert!(store.get("progress/abc").await.unwrap().is_none());
        store.set("progress/abc", json!([1, 2, 3])).await.unwrap();
        assert_eq!(
            store.get("progress/abc").await.unwrap(),
            Some(json!([1, 2, 3]))
        );
    }

    #[tokio::test]
    async fn test_file_store_sanitizes_keys() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileKvStore::new(dir.path());

        store.set("streak/state", json!(1)).await.unwrap();
        assert!(dir.path().join("streak_state.json").exists());
    }
}
