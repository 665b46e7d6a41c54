use vellum_types::{FileId, ResolvedFile};

use crate::error::CacheResult;

/// Cache of materialized files keyed by [`FileId`].
///
/// Implementations must satisfy these invariants:
/// - `put` is an unconditional overwrite (last writer wins). The previous
///   entry is handed back so its temporary handle can be released.
/// - Entries live until [`FileCache::drain`] is called; there is no
///   eviction policy.
/// - No side effects beyond the mapping itself.
pub trait FileCache: Send + Sync {
    /// Look up a resolved file.
    fn get(&self, id: &FileId) -> CacheResult<Option<ResolvedFile>>;

    /// Insert a resolved file, returning whatever it replaced.
    fn put(&self, id: FileId, file: ResolvedFile) -> CacheResult<Option<ResolvedFile>>;

    /// Remove and return every entry (full reset).
    fn drain(&self) -> CacheResult<Vec<(FileId, ResolvedFile)>>;

    /// Whether an entry exists for `id`.
    fn contains(&self, id: &FileId) -> CacheResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}
