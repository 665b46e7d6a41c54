use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info};
use vellum_cache::{FileCache, InFlightTracker, InMemoryFileCache};
use vellum_document::{DocumentHost, StatusReporter};
use vellum_loader::{Collaborators, EventStream, LoadPipeline, LoadReport, LoaderConfig};
use vellum_types::{PlaceholderRef, StatusKey};

use crate::error::{SdkError, SdkResult};

/// High-level media loader for one document.
///
/// Owns the process-scoped state (materialized-file cache, in-flight
/// tracker, status map) and hands it to a shared [`LoadPipeline`]. State
/// lives until [`FileLoader::reset`].
pub struct FileLoader {
    document: Arc<dyn DocumentHost>,
    cache: Arc<dyn FileCache>,
    tracker: Arc<InFlightTracker>,
    pipeline: Arc<LoadPipeline>,
}

impl FileLoader {
    /// Create a loader with an empty in-memory cache.
    pub fn new(
        config: LoaderConfig,
        collaborators: Collaborators,
        document: Arc<dyn DocumentHost>,
    ) -> Self {
        Self::with_cache(config, collaborators, document, Arc::new(InMemoryFileCache::new()))
    }

    /// Create a loader over an existing cache.
    pub fn with_cache(
        config: LoaderConfig,
        collaborators: Collaborators,
        document: Arc<dyn DocumentHost>,
        cache: Arc<dyn FileCache>,
    ) -> Self {
        let tracker = Arc::new(InFlightTracker::new());
        let pipeline = LoadPipeline::new(
            config,
            collaborators,
            Arc::clone(&document),
            Arc::clone(&cache),
            Arc::clone(&tracker),
        );
        Self {
            document,
            cache,
            tracker,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Create a loader from a TOML configuration document.
    pub fn from_toml(
        toml: &str,
        collaborators: Collaborators,
        document: Arc<dyn DocumentHost>,
    ) -> SdkResult<Self> {
        let config = LoaderConfig::from_toml_str(toml)?;
        Ok(Self::new(config, collaborators, document))
    }

    // ---- Accessors ----

    pub fn document(&self) -> &Arc<dyn DocumentHost> {
        &self.document
    }

    pub fn cache(&self) -> &Arc<dyn FileCache> {
        &self.cache
    }

    pub fn tracker(&self) -> &Arc<InFlightTracker> {
        &self.tracker
    }

    pub fn pipeline(&self) -> &Arc<LoadPipeline> {
        &self.pipeline
    }

    pub fn status(&self) -> &Arc<StatusReporter> {
        self.pipeline.status()
    }

    pub fn subscribe(&self) -> EventStream {
        self.pipeline.subscribe()
    }

    // ---- Loading ----

    /// Scan the document and resolve every placeholder concurrently.
    ///
    /// Returns one report per placeholder, in document order, once every
    /// started pipeline has finished.
    pub async fn load_all(&self) -> SdkResult<Vec<LoadReport>> {
        let placeholders = self.document.scan_placeholders()?;
        info!(count = placeholders.len(), "loading placeholders");

        let mut tasks = JoinSet::new();
        for (index, placeholder) in placeholders.into_iter().enumerate() {
            let pipeline = Arc::clone(&self.pipeline);
            tasks.spawn(async move { (index, pipeline.resolve(&placeholder).await) });
        }

        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            reports.push(joined.map_err(|e| SdkError::Task(e.to_string()))?);
        }
        reports.sort_by_key(|(index, _)| *index);
        Ok(reports.into_iter().map(|(_, report)| report).collect())
    }

    /// Resolve a single placeholder.
    pub async fn load(&self, placeholder: &PlaceholderRef) -> LoadReport {
        self.pipeline.resolve(placeholder).await
    }

    // ---- Cursor status ----

    /// Show `message` at the document cursor. Keep the returned key to
    /// remove it later.
    pub fn insert_status_at_cursor(&self, message: &str) -> SdkResult<StatusKey> {
        Ok(self.status().insert_at_cursor(message)?)
    }

    /// Remove a status previously inserted at the cursor.
    pub fn remove_cursor_status(&self, key: &StatusKey) -> SdkResult<bool> {
        Ok(self.status().remove_by_key(key)?)
    }

    // ---- Lifecycle ----

    /// Drop every cached file, releasing its temporary handle, and remove
    /// all live status elements. Returns the number of handles released.
    pub fn reset(&self) -> SdkResult<usize> {
        let drained = self.cache.drain()?;
        let materializer = &self.pipeline.collaborators().materializer;
        for (id, file) in &drained {
            debug!(file_id = %id, url = file.handle.url(), "releasing cached handle");
            materializer.release(&file.handle);
        }
        self.status().reset()?;
        info!(released = drained.len(), "loader reset");
        Ok(drained.len())
    }
}

impl std::fmt::Debug for FileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLoader")
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;
    use vellum_document::{attrs, Element, InMemoryDocument};
    use vellum_loader::{
        BlobUrlMaterializer, Decryptor, Downloader, InMemoryDescriptorIndex, LoadOutcome,
        LoaderResult, SkipReason,
    };
    use vellum_types::{DecryptedPayload, EncryptedItem, FileDescriptor, FileId};

    #[derive(Default)]
    struct CountingDownloader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Downloader for CountingDownloader {
        async fn download(&self, descriptor: &FileDescriptor) -> LoaderResult<EncryptedItem> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok(EncryptedItem {
                id: descriptor.id.clone(),
                data: Bytes::from_static(b"\x89PNG"),
            })
        }
    }

    struct Plaintext;

    #[async_trait]
    impl Decryptor for Plaintext {
        async fn decrypt(
            &self,
            _descriptor: &FileDescriptor,
            item: EncryptedItem,
        ) -> LoaderResult<DecryptedPayload> {
            Ok(DecryptedPayload::new(item.data))
        }
    }

    struct Fixture {
        doc: Arc<InMemoryDocument>,
        downloader: Arc<CountingDownloader>,
        blobs: Arc<BlobUrlMaterializer>,
        loader: FileLoader,
    }

    fn fixture() -> Fixture {
        let doc = Arc::new(InMemoryDocument::new());
        let downloader = Arc::new(CountingDownloader::default());
        let blobs = Arc::new(BlobUrlMaterializer::new());
        let index = InMemoryDescriptorIndex::from_descriptors([
            FileDescriptor::new(FileId::new("cat").unwrap(), "image/png"),
            FileDescriptor::new(FileId::new("song").unwrap(), "audio/mpeg"),
        ]);
        let collaborators = Collaborators {
            lookup: Arc::new(index),
            downloader: downloader.clone(),
            decryptor: Arc::new(Plaintext),
            materializer: blobs.clone(),
        };
        let loader = FileLoader::new(LoaderConfig::immediate(), collaborators, doc.clone());
        Fixture {
            doc,
            downloader,
            blobs,
            loader,
        }
    }

    impl Fixture {
        fn add_placeholder(&self, id: &str) {
            let p = self.doc.append(self.doc.root(), Element::new("p")).unwrap();
            self.doc
                .append(
                    p,
                    Element::new("span")
                        .attr(attrs::PLACEHOLDER, "true")
                        .attr(attrs::FILE_ID, id),
                )
                .unwrap();
        }

        fn label_texts(&self) -> Vec<String> {
            self.doc
                .find_by_tag("label")
                .into_iter()
                .filter_map(|n| self.doc.element(n).unwrap().text)
                .collect()
        }
    }

    #[tokio::test]
    async fn load_all_resolves_every_placeholder() {
        let f = fixture();
        f.add_placeholder("cat");
        f.add_placeholder("song");
        f.add_placeholder("missing");

        let reports = f.loader.load_all().await.unwrap();

        assert_eq!(reports.len(), 3);
        assert!(reports[0].is_success());
        assert!(reports[1].is_success());
        assert_eq!(
            reports[2].outcome.failure().unwrap().message,
            "Unable to find file missing."
        );
        assert_eq!(f.doc.find_by_tag("img").len(), 1);
        assert_eq!(f.doc.find_by_tag("audio").len(), 1);
        assert_eq!(f.label_texts(), vec!["Unable to find file missing.".to_string()]);
        assert!(f.doc.scan_placeholders().unwrap().len() == 1);
        assert!(f.loader.tracker().is_empty());
    }

    #[tokio::test]
    async fn duplicate_placeholders_download_once() {
        let f = fixture();
        f.add_placeholder("cat");
        f.add_placeholder("cat");
        f.add_placeholder("cat");

        let reports = f.loader.load_all().await.unwrap();

        assert_eq!(f.downloader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.doc.find_by_tag("img").len(), 3);
        assert!(f.doc.scan_placeholders().unwrap().is_empty());
        assert!(reports.iter().all(|r| r.is_success()
            || r.outcome == LoadOutcome::Skipped(SkipReason::AlreadyLoading)));
        assert_eq!(f.blobs.live_count(), 1);
    }

    #[tokio::test]
    async fn reload_uses_cache() {
        let f = fixture();
        f.add_placeholder("cat");
        f.loader.load_all().await.unwrap();
        f.add_placeholder("cat");

        let reports = f.loader.load_all().await.unwrap();

        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_success());
        assert_eq!(f.downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_releases_handles_and_statuses() {
        let f = fixture();
        f.add_placeholder("cat");
        f.add_placeholder("missing");
        f.loader.load_all().await.unwrap();
        assert_eq!(f.blobs.live_count(), 1);
        assert_eq!(f.label_texts().len(), 1);

        let released = f.loader.reset().unwrap();

        assert_eq!(released, 1);
        assert_eq!(f.blobs.live_count(), 0);
        assert!(f.loader.cache().drain().unwrap().is_empty());
        assert!(f.label_texts().is_empty());
        assert_eq!(f.loader.status().live_count(), 0);
    }

    #[test]
    fn cursor_status_round_trip() {
        let f = fixture();
        let key = f.loader.insert_status_at_cursor("Saving...").unwrap();
        assert!(matches!(key, StatusKey::Synthetic(_)));
        assert_eq!(f.label_texts(), vec!["Saving...".to_string()]);

        assert!(f.loader.remove_cursor_status(&key).unwrap());
        assert!(f.label_texts().is_empty());
        assert!(!f.loader.remove_cursor_status(&key).unwrap());
    }

    #[tokio::test]
    async fn subscribers_see_every_placeholder_finish() {
        let f = fixture();
        f.add_placeholder("cat");
        f.add_placeholder("song");
        let mut events = f.loader.subscribe();

        f.loader.load_all().await.unwrap();

        let mut finished = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event.kind, vellum_loader::LoadEventKind::Finished(_)) {
                finished += 1;
            }
        }
        assert_eq!(finished, 2);
    }

    #[test]
    fn from_toml_rejects_bad_config() {
        let f = fixture();
        let collaborators = f.loader.pipeline().collaborators().clone();
        let err = FileLoader::from_toml("event_capacity = -1", collaborators, f.doc.clone())
            .unwrap_err();
        assert!(matches!(err, SdkError::Loader(_)));
    }
}
