//! In-memory descriptor index.

use std::collections::HashMap;
use std::sync::RwLock;

use vellum_types::{FileDescriptor, FileId};

use crate::collab::DescriptorLookup;
use crate::error::{LoaderError, LoaderResult};

/// A [`DescriptorLookup`] backed by a `HashMap` behind a `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryDescriptorIndex {
    descriptors: RwLock<HashMap<FileId, FileDescriptor>>,
}

impl InMemoryDescriptorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from descriptors; later duplicates win.
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = FileDescriptor>) -> Self {
        let map = descriptors.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self {
            descriptors: RwLock::new(map),
        }
    }

    /// Add or replace a descriptor.
    pub fn insert(&self, descriptor: FileDescriptor) -> LoaderResult<Option<FileDescriptor>> {
        let mut map = self
            .descriptors
            .write()
            .map_err(|e| LoaderError::Lookup(e.to_string()))?;
        Ok(map.insert(descriptor.id.clone(), descriptor))
    }

    /// Remove a descriptor.
    pub fn remove(&self, id: &FileId) -> LoaderResult<Option<FileDescriptor>> {
        let mut map = self
            .descriptors
            .write()
            .map_err(|e| LoaderError::Lookup(e.to_string()))?;
        Ok(map.remove(id))
    }

    pub fn len(&self) -> usize {
        self.descriptors.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DescriptorLookup for InMemoryDescriptorIndex {
    fn find_descriptor(&self, id: &FileId) -> LoaderResult<Option<FileDescriptor>> {
        let map = self
            .descriptors
            .read()
            .map_err(|e| LoaderError::Lookup(e.to_string()))?;
        Ok(map.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, ty: &str) -> FileDescriptor {
        FileDescriptor::new(FileId::new(id).unwrap(), ty)
    }

    #[test]
    fn lookup_hits_and_misses() {
        let index = InMemoryDescriptorIndex::from_descriptors([descriptor("a", "image/png")]);
        let hit = index.find_descriptor(&FileId::new("a").unwrap()).unwrap();
        assert_eq!(hit.unwrap().media_type, "image/png");
        assert!(index.find_descriptor(&FileId::new("b").unwrap()).unwrap().is_none());
    }

    #[test]
    fn insert_replaces_and_remove_deletes() {
        let index = InMemoryDescriptorIndex::new();
        assert!(index.insert(descriptor("a", "image/png")).unwrap().is_none());
        let prev = index.insert(descriptor("a", "video/mp4")).unwrap();
        assert_eq!(prev.unwrap().media_type, "image/png");
        assert_eq!(index.len(), 1);
        index.remove(&FileId::new("a").unwrap()).unwrap();
        assert!(index.is_empty());
    }
}
