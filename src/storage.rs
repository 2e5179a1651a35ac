//! Persistent key/value surface standing in for browser local storage.
//!
//! Values are plain strings, no structured encoding. There is no locking across
//! processes and no transactions: last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, instrument};

use crate::error::StoreError;

pub trait KeyValueStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
  fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn lock(entries: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
  // Poisoned locks still guard a consistent map.
  entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-lifetime store. Used when COURSE_STORE_PATH is not set, and in tests.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    lock(&self.entries).get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    lock(&self.entries).insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), StoreError> {
    lock(&self.entries).remove(key);
    Ok(())
  }
}

/// JSON-object file, rewritten in full on every change.
pub struct FileStore {
  path: PathBuf,
  entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
  /// Load `path` if it exists; a missing file is an empty store.
  #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
  pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
    let path = path.as_ref().to_path_buf();
    let entries = match std::fs::read_to_string(&path) {
      Ok(s) if s.trim().is_empty() => BTreeMap::new(),
      Ok(s) => serde_json::from_str::<BTreeMap<String, String>>(&s)
        .map_err(|source| StoreError::Corrupt { path: path.clone(), source })?,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
      Err(source) => return Err(StoreError::Io { path, source }),
    };
    info!(target: "llm_course_backend", keys = entries.len(), "File store opened");
    Ok(Self { path, entries: Mutex::new(entries) })
  }

  fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io { path: self.path.clone(), source };
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_string_pretty(entries)
      .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;
    let tmp = self.path.with_extension("tmp");
    std::fs::write(&tmp, body).map_err(io_err)?;
    std::fs::rename(&tmp, &self.path).map_err(io_err)?;
    debug!(target: "llm_course_backend", keys = entries.len(), "File store persisted");
    Ok(())
  }

  /// Apply `change` to a copy, persist it, then commit it in memory.
  /// The lock is held across the write so files land in update order. HTTP
  /// handlers reach this through `spawn_blocking`; a WS connection writes inline
  /// on its own task.
  fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
    let mut guard = lock(&self.entries);
    let mut next = guard.clone();
    change(&mut next);
    self.persist(&next)?;
    *guard = next;
    Ok(())
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Option<String> {
    lock(&self.entries).get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    self.update(|m| {
      m.insert(key.to_string(), value.to_string());
    })
  }

  fn remove(&self, key: &str) -> Result<(), StoreError> {
    if !lock(&self.entries).contains_key(key) {
      return Ok(());
    }
    self.update(|m| {
      m.remove(key);
    })
  }
}
