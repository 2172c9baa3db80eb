use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{RecipeBookError, Result};

/// Host-provided persistent key-value facility holding one blob per key.
pub trait KeyValueStore {
    /// Returns `None` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces the whole value stored under `key`.
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Read {} bytes for key '{}' from {:?}", bytes.len(), key, path);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(RecipeBookError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let io_err = |source| RecipeBookError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(io_err)?;
        debug!("Wrote {} bytes for key '{}' to {:?}", value.len(), key, path);
        Ok(())
    }
}

/// Volatile backend, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        assert!(store.get("recipes").unwrap().is_none());
    }

    #[test]
    fn test_file_store_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("data").join("recipe-book");
        let mut store = FileKvStore::new(&nested);
        store.set("likes", r#"["牛肉"]"#.as_bytes()).unwrap();

        assert!(nested.join("likes.json").exists());
        assert_eq!(store.get("likes").unwrap().unwrap(), r#"["牛肉"]"#.as_bytes());
    }

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemoryKvStore::new().with_entry("k", "a");
        store.set("k", b"b").unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"b".to_vec()));
    }
}
