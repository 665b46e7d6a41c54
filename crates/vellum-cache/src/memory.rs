//! In-memory file cache for the lifetime of the process.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use vellum_types::{FileId, ResolvedFile};

use crate::error::{CacheError, CacheResult};
use crate::traits::FileCache;

/// An in-memory implementation of [`FileCache`].
///
/// All entries live in a `HashMap` behind a `RwLock`. Data is lost when the
/// cache is dropped.
#[derive(Debug, Default)]
pub struct InMemoryFileCache {
    entries: RwLock<HashMap<FileId, ResolvedFile>>,
}

impl InMemoryFileCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached files.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of cached identifiers.
    pub fn ids(&self) -> CacheResult<Vec<FileId>> {
        let map = self.entries.read().map_err(poisoned)?;
        let mut ids: Vec<FileId> = map.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> CacheError {
    CacheError::Poisoned(e.to_string())
}

impl FileCache for InMemoryFileCache {
    fn get(&self, id: &FileId) -> CacheResult<Option<ResolvedFile>> {
        let map = self.entries.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn put(&self, id: FileId, file: ResolvedFile) -> CacheResult<Option<ResolvedFile>> {
        let mut map = self.entries.write().map_err(poisoned)?;
        debug!(file_id = %id, handle = %file.handle, "caching materialized file");
        Ok(map.insert(id, file))
    }

    fn drain(&self) -> CacheResult<Vec<(FileId, ResolvedFile)>> {
        let mut map = self.entries.write().map_err(poisoned)?;
        Ok(map.drain().collect())
    }

    fn contains(&self, id: &FileId) -> CacheResult<bool> {
        let map = self.entries.read().map_err(poisoned)?;
        Ok(map.contains_key(id))
    }
}
