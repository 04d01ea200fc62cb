//! Local key-value storage
//!
//! A string-to-string map persisted as one JSON file, with every value itself
//! a serialized record. Tasks, registered accounts and the current session
//! marker each live under their own key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// File-backed key-value store
pub struct LocalStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Open the store at `path`
    ///
    /// A missing or blank file yields an empty store; the file is created on
    /// first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                Error::Persistence(format!("Failed to read storage file: {}", e))
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    Error::Persistence(format!("Failed to parse storage file: {}", e))
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn set_item(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.into());
        self.commit(&mut entries, next).await
    }

    /// Remove a key, returning whether it was present
    pub async fn remove_item(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(false);
        }
        let mut next = entries.clone();
        next.remove(key);
        self.commit(&mut entries, next).await?;
        Ok(true)
    }

    /// Read and deserialize the record under `key`
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, raw).await
    }

    /// Read-modify-write the record under `key` while holding the write lock
    ///
    /// Nothing is written when `apply` fails.
    pub async fn update<T, R, F>(&self, key: &str, apply: F) -> Result<R>
    where
        T: Default + Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> Result<R>,
    {
        let mut entries = self.entries.write().await;
        let mut value: T = match entries.get(key) {
            Some(raw) => serde_json::from_str(raw)?,
            None => T::default(),
        };

        let result = apply(&mut value)?;

        let mut next = entries.clone();
        next.insert(key.to_string(), serde_json::to_string(&value)?);
        self.commit(&mut entries, next).await?;
        Ok(result)
    }

    /// Write `next` to disk, then make it the cached state
    ///
    /// On a failed write the cache keeps matching the file.
    async fn commit(
        &self,
        entries: &mut BTreeMap<String, String>,
        next: BTreeMap<String, String>,
    ) -> Result<()> {
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries).map_err(|e| {
            Error::Persistence(format!("Failed to serialize storage: {}", e))
        })?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Persistence(format!("Failed to create directory: {}", e))
            })?;
        }

        tokio::fs::write(&self.path, content).await.map_err(|e| {
            Error::Persistence(format!("Failed to write storage file: {}", e))
        })?;

        Ok(())
    }
}
