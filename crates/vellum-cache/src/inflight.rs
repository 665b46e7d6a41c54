//! Tracking of identifiers with a resolution pipeline in progress.
//!
//! Admission is a single check-and-insert under one lock, so two pipelines
//! for the same identifier can never both become the owner. The owner holds
//! an [`InFlightGuard`]; dropping or releasing the guard removes the
//! identifier exactly once, on every exit path.
//!
//! Placeholders turned away because their identifier is already loading are
//! parked as *waiters* on the owner. The owner receives them back when it
//! releases its guard and can render into them without a re-scan.
//!
//! On success the owner hands the identifier over with
//! [`InFlightGuard::complete`]: the tracker entry is removed and the file is
//! cached while a handover lock is held exclusively. [`InFlightTracker::wait_on`]
//! and [`InFlightTracker::admit`] take that lock shared, so once either of
//! them reports the identifier as not loading, any completed load is already
//! visible in the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};

use tracing::debug;
use vellum_types::{FileId, PlaceholderRef, ResolvedFile};

use crate::error::CacheResult;
use crate::traits::FileCache;

/// Result of asking the tracker for ownership of an identifier.
#[derive(Debug)]
pub enum Admission {
    /// The caller now owns the pipeline for this identifier.
    Owner(InFlightGuard),
    /// Another pipeline owns the identifier; the placeholder was parked.
    Waiting,
}

impl Admission {
    /// Returns `true` if the caller became the owner.
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner(_))
    }
}

/// Set of identifiers currently undergoing resolution.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    loading: Mutex<HashMap<FileId, Vec<PlaceholderRef>>>,
    /// Held exclusively while an owner moves its identifier from the
    /// tracker into the cache.
    handover: RwLock<()>,
}

impl InFlightTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recover the map even if a holder panicked: the map itself is always
    /// left in a consistent state by every critical section below.
    fn entries(&self) -> MutexGuard<'_, HashMap<FileId, Vec<PlaceholderRef>>> {
        self.loading.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handover_shared(&self) -> RwLockReadGuard<'_, ()> {
        self.handover.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether a pipeline is currently running for `id`.
    pub fn is_loading(&self, id: &FileId) -> bool {
        self.entries().contains_key(id)
    }

    /// Park `placeholder` on the running pipeline for its identifier.
    ///
    /// Returns `false` (and parks nothing) if no pipeline is running.
    pub fn wait_on(&self, placeholder: &PlaceholderRef) -> bool {
        let _handover = self.handover_shared();
        let mut map = self.entries();
        match map.get_mut(&placeholder.file_id) {
            Some(waiters) => {
                debug!(file_id = %placeholder.file_id, node = %placeholder.node, "placeholder parked on in-flight load");
                waiters.push(placeholder.clone());
                true
            }
            None => false,
        }
    }

    /// Atomically claim `placeholder`'s identifier, or park the placeholder
    /// if another pipeline already owns it.
    pub fn admit(self: &Arc<Self>, placeholder: &PlaceholderRef) -> Admission {
        let _handover = self.handover_shared();
        let mut map = self.entries();
        if let Some(waiters) = map.get_mut(&placeholder.file_id) {
            waiters.push(placeholder.clone());
            debug!(file_id = %placeholder.file_id, "identifier already in flight");
            return Admission::Waiting;
        }
        map.insert(placeholder.file_id.clone(), Vec::new());
        debug!(file_id = %placeholder.file_id, "identifier admitted");
        Admission::Owner(InFlightGuard {
            tracker: Arc::clone(self),
            id: placeholder.file_id.clone(),
            released: false,
        })
    }

    /// Number of identifiers in flight.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Sorted list of identifiers in flight.
    pub fn loading_ids(&self) -> Vec<FileId> {
        let mut ids: Vec<FileId> = self.entries().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn remove(&self, id: &FileId) -> Vec<PlaceholderRef> {
        let waiters = self.entries().remove(id).unwrap_or_default();
        debug!(file_id = %id, waiters = waiters.len(), "identifier released");
        waiters
    }
}

/// Ownership of one in-flight identifier.
///
/// Removal from the tracker happens exactly once: on [`InFlightGuard::release`]
/// or, if that is never called, on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    tracker: Arc<InFlightTracker>,
    id: FileId,
    released: bool,
}

impl InFlightGuard {
    /// The identifier this guard owns.
    pub fn file_id(&self) -> &FileId {
        &self.id
    }

    /// Remove the identifier from the tracker and hand back any placeholders
    /// that were parked on it.
    pub fn release(mut self) -> Vec<PlaceholderRef> {
        self.release_once()
    }

    /// Remove the identifier from the tracker, then store `file` in `cache`,
    /// as one step with respect to [`InFlightTracker::wait_on`] and
    /// [`InFlightTracker::admit`].
    ///
    /// Returns the parked waiters and the result of the cache insertion.
    pub fn complete(
        mut self,
        cache: &dyn FileCache,
        file: ResolvedFile,
    ) -> (Vec<PlaceholderRef>, CacheResult<Option<ResolvedFile>>) {
        let tracker = Arc::clone(&self.tracker);
        let _handover = tracker.handover.write().unwrap_or_else(|e| e.into_inner());
        let waiters = self.release_once();
        let stored = cache.put(self.id.clone(), file);
        (waiters, stored)
    }

    fn release_once(&mut self) -> Vec<PlaceholderRef> {
        if self.released {
            return Vec::new();
        }
        self.released = true;
        self.tracker.remove(&self.id)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use crate::memory::InMemoryFileCache;
    use vellum_types::{NodeId, TempHandle};

    fn placeholder(node: u64, id: &str) -> PlaceholderRef {
        PlaceholderRef::new(NodeId::new(node), FileId::new(id).unwrap())
    }

    #[test]
    fn first_admission_owns() {
        let tracker = Arc::new(InFlightTracker::new());
        let admission = tracker.admit(&placeholder(1, "abc"));
        assert!(admission.is_owner());
        assert!(tracker.is_loading(&FileId::new("abc").unwrap()));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn second_admission_waits() {
        let tracker = Arc::new(InFlightTracker::new());
        let _owner = tracker.admit(&placeholder(1, "abc"));
        let second = tracker.admit(&placeholder(2, "abc"));
        assert!(!second.is_owner());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn different_ids_are_independent() {
        let tracker = Arc::new(InFlightTracker::new());
        let a = tracker.admit(&placeholder(1, "a"));
        let b = tracker.admit(&placeholder(2, "b"));
        assert!(a.is_owner() && b.is_owner());
        assert_eq!(
            tracker.loading_ids(),
            vec![FileId::new("a").unwrap(), FileId::new("b").unwrap()]
        );
    }

    #[test]
    fn release_returns_waiters_and_clears() {
        let tracker = Arc::new(InFlightTracker::new());
        let Admission::Owner(guard) = tracker.admit(&placeholder(1, "abc")) else {
            panic!("expected owner");
        };
        tracker.admit(&placeholder(2, "abc"));
        assert!(tracker.wait_on(&placeholder(3, "abc")));

        let waiters = guard.release();
        let nodes: Vec<u64> = waiters.iter().map(|w| w.node.raw()).collect();
        assert_eq!(nodes, vec![2, 3]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn drop_releases() {
        let tracker = Arc::new(InFlightTracker::new());
        {
            let _owner = tracker.admit(&placeholder(1, "abc"));
            assert!(!tracker.is_empty());
        }
        assert!(tracker.is_empty());
        assert!(tracker.admit(&placeholder(2, "abc")).is_owner());
    }

    #[test]
    fn release_does_not_remove_a_later_owner() {
        let tracker = Arc::new(InFlightTracker::new());
        let Admission::Owner(first) = tracker.admit(&placeholder(1, "abc")) else {
            panic!("expected owner");
        };
        first.release();
        let _second = tracker.admit(&placeholder(2, "abc"));
        // `first` was consumed by release; its drop must not clear `_second`.
        assert!(tracker.is_loading(&FileId::new("abc").unwrap()));
    }

    #[test]
    fn wait_on_idle_id_parks_nothing() {
        let tracker = InFlightTracker::new();
        assert!(!tracker.wait_on(&placeholder(1, "abc")));
        assert!(tracker.is_empty());
    }

    /// Cache that records whether the identifier was still tracked when
    /// `put` ran, and can hold `put` open until told to continue.
    struct RecordingCache {
        inner: InMemoryFileCache,
        tracker: Arc<InFlightTracker>,
        loading_at_put: Mutex<Vec<bool>>,
        gate: Option<(Mutex<mpsc::Sender<()>>, Mutex<mpsc::Receiver<()>>)>,
    }

    impl RecordingCache {
        fn new(tracker: Arc<InFlightTracker>) -> Self {
            Self {
                inner: InMemoryFileCache::new(),
                tracker,
                loading_at_put: Mutex::new(Vec::new()),
                gate: None,
            }
        }
    }

    impl FileCache for RecordingCache {
        fn get(&self, id: &FileId) -> CacheResult<Option<ResolvedFile>> {
            self.inner.get(id)
        }

        fn put(&self, id: FileId, file: ResolvedFile) -> CacheResult<Option<ResolvedFile>> {
            self.loading_at_put.lock().unwrap().push(self.tracker.is_loading(&id));
            if let Some((entered, proceed)) = &self.gate {
                entered.lock().unwrap().send(()).unwrap();
                proceed.lock().unwrap().recv().unwrap();
            }
            self.inner.put(id, file)
        }

        fn drain(&self) -> CacheResult<Vec<(FileId, ResolvedFile)>> {
            self.inner.drain()
        }
    }

    fn resolved() -> ResolvedFile {
        ResolvedFile::new(TempHandle::new("blob:vellum/1"), "image/png", "cat.png")
    }

    #[test]
    fn complete_untracks_before_caching() {
        let tracker = Arc::new(InFlightTracker::new());
        let cache = RecordingCache::new(Arc::clone(&tracker));
        let Admission::Owner(guard) = tracker.admit(&placeholder(1, "abc")) else {
            panic!("expected owner");
        };
        assert!(tracker.wait_on(&placeholder(2, "abc")));

        let (waiters, stored) = guard.complete(&cache, resolved());

        assert_eq!(*cache.loading_at_put.lock().unwrap(), vec![false]);
        assert!(stored.unwrap().is_none());
        assert_eq!(waiters.len(), 1);
        assert!(tracker.is_empty());
        assert!(cache.get(&FileId::new("abc").unwrap()).unwrap().is_some());
    }

    #[test]
    fn waiters_never_observe_the_handover_gap() {
        let tracker = Arc::new(InFlightTracker::new());
        let (entered_tx, entered_rx) = mpsc::channel();
        let (proceed_tx, proceed_rx) = mpsc::channel();
        let mut cache = RecordingCache::new(Arc::clone(&tracker));
        cache.gate = Some((Mutex::new(entered_tx), Mutex::new(proceed_rx)));
        let cache = Arc::new(cache);

        let Admission::Owner(guard) = tracker.admit(&placeholder(1, "abc")) else {
            panic!("expected owner");
        };
        let owner = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || guard.complete(cache.as_ref(), resolved()))
        };
        // The owner is inside `put`: untracked, but not yet cached.
        entered_rx.recv().unwrap();
        assert!(!tracker.is_loading(&FileId::new("abc").unwrap()));

        let latecomer = {
            let tracker = Arc::clone(&tracker);
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let parked = tracker.wait_on(&placeholder(2, "abc"));
                let cached = cache.get(&FileId::new("abc").unwrap()).unwrap();
                (parked, cached)
            })
        };
        thread::sleep(Duration::from_millis(50));
        proceed_tx.send(()).unwrap();

        owner.join().unwrap();
        let (parked, cached) = latecomer.join().unwrap();
        assert!(!parked);
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn concurrent_admissions_yield_one_owner() {
        let tracker = Arc::new(InFlightTracker::new());
        let mut handles = Vec::new();
        for node in 0..16u64 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(async move {
                match tracker.admit(&placeholder(node, "shared")) {
                    Admission::Owner(guard) => {
                        std::mem::forget(guard);
                        true
                    }
                    Admission::Waiting => false,
                }
            }));
        }
        let mut owners = 0;
        for h in handles {
            if h.await.unwrap() {
                owners += 1;
            }
        }
        assert_eq!(owners, 1);
    }
}
