//! The load pipeline: one placeholder from lookup to rendered media.
//!
//! ```text
//! Idle -> CacheCheck --hit--------------------------------------> Rendering -> Done
//!           | miss
//!           v
//!        InFlightCheck --loading--> Skipped (placeholder parked on the owner)
//!           v
//!        Lookup --missing--> Errored
//!           v
//!        CollisionCheck --rendered elsewhere--> Skipped (Rendering if now cached)
//!           v
//!        Admission --lost race--> Skipped
//!           v
//!        Downloading -> Decrypting -> Materializing -> Rendering -> Done
//!              \             \              \              \
//!               `-------------`--------------`--------------`--> Errored
//! ```
//!
//! Everything up to and including `Admission` is synchronous, so the
//! identifier is registered before the first suspension point. Faults from
//! collaborators never escape `resolve`: each one becomes a status message
//! and a [`LoadOutcome::Failed`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use vellum_cache::{Admission, FileCache, InFlightGuard, InFlightTracker};
use vellum_document::{Anchor, DocumentHost, StatusReporter};
use vellum_render::RenderDispatcher;
use vellum_types::{PlaceholderRef, ResolvedFile, StatusKey};

use crate::collab::Collaborators;
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::event::{EventBus, EventStream, LoadEvent, LoadEventKind};
use crate::outcome::{
    FailureKind, LoadFailure, LoadOutcome, LoadPhase, LoadReport, PhaseRecord, RenderSource,
    SkipReason,
};

// ---------------------------------------------------------------------------
// Run: bookkeeping for one resolve call
// ---------------------------------------------------------------------------

struct Run<'a> {
    placeholder: &'a PlaceholderRef,
    name: String,
    events: &'a EventBus,
    phases: Vec<PhaseRecord>,
    current: LoadPhase,
    phase_started: Instant,
    started: Instant,
}

impl<'a> Run<'a> {
    fn start(placeholder: &'a PlaceholderRef, name: String, events: &'a EventBus) -> Self {
        let now = Instant::now();
        Self {
            placeholder,
            name,
            events,
            phases: Vec::new(),
            current: LoadPhase::Idle,
            phase_started: now,
            started: now,
        }
    }

    fn close_current(&mut self) {
        if self.current != LoadPhase::Idle {
            self.phases.push(PhaseRecord {
                phase: self.current,
                elapsed: self.phase_started.elapsed(),
            });
        }
    }

    fn enter(&mut self, phase: LoadPhase) {
        self.close_current();
        self.current = phase;
        self.phase_started = Instant::now();
        debug!(file_id = %self.placeholder.file_id, node = %self.placeholder.node, %phase, "phase");
        self.publish(LoadEventKind::Phase(phase));
    }

    fn publish(&self, kind: LoadEventKind) {
        self.events.publish(LoadEvent {
            file_id: self.placeholder.file_id.clone(),
            placeholder: self.placeholder.node,
            kind,
        });
    }

    fn finish(mut self, outcome: LoadOutcome) -> LoadReport {
        self.close_current();
        match &outcome {
            LoadOutcome::Rendered { source, .. } => {
                info!(file_id = %self.placeholder.file_id, ?source, "file rendered")
            }
            LoadOutcome::Skipped(reason) => {
                debug!(file_id = %self.placeholder.file_id, ?reason, "load skipped")
            }
            LoadOutcome::Failed(failure) => {
                warn!(file_id = %self.placeholder.file_id, phase = %failure.phase, kind = ?failure.kind, "load failed")
            }
        }
        self.publish(LoadEventKind::Finished(outcome.clone()));
        LoadReport {
            file_id: self.placeholder.file_id.clone(),
            placeholder: self.placeholder.node,
            outcome,
            phases: self.phases,
            elapsed: self.started.elapsed(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadPipeline
// ---------------------------------------------------------------------------

/// Resolves placeholders into rendered media.
///
/// One pipeline instance serves every placeholder of a document. The cache,
/// tracker, and document are injected so several pipelines (or a pipeline
/// and its owner) can share them.
pub struct LoadPipeline {
    collaborators: Collaborators,
    document: Arc<dyn DocumentHost>,
    cache: Arc<dyn FileCache>,
    tracker: Arc<InFlightTracker>,
    status: Arc<StatusReporter>,
    dispatcher: RenderDispatcher,
    events: EventBus,
    config: LoaderConfig,
}

impl LoadPipeline {
    pub fn new(
        config: LoaderConfig,
        collaborators: Collaborators,
        document: Arc<dyn DocumentHost>,
        cache: Arc<dyn FileCache>,
        tracker: Arc<InFlightTracker>,
    ) -> Self {
        let status = Arc::new(StatusReporter::new(
            Arc::clone(&document),
            config.placement.clone(),
        ));
        let dispatcher = RenderDispatcher::with_default_strategies(
            config.render.clone(),
            config.placement.clone(),
        );
        Self {
            collaborators,
            document,
            cache,
            tracker,
            status,
            dispatcher,
            events: EventBus::new(config.event_capacity),
            config,
        }
    }

    /// Replace the render dispatcher (e.g. to add custom strategies).
    pub fn with_dispatcher(mut self, dispatcher: RenderDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn status(&self) -> &Arc<StatusReporter> {
        &self.status
    }

    pub fn document(&self) -> &Arc<dyn DocumentHost> {
        &self.document
    }

    pub fn cache(&self) -> &Arc<dyn FileCache> {
        &self.cache
    }

    pub fn tracker(&self) -> &Arc<InFlightTracker> {
        &self.tracker
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Subscribe to phase and outcome events of every resolve call.
    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    /// Resolve one placeholder. Never fails: faults are reported in the
    /// returned [`LoadReport`] and as status text in the document.
    pub async fn resolve(&self, placeholder: &PlaceholderRef) -> LoadReport {
        let name = placeholder.display_name(&self.config.fallback_name);
        let mut run = Run::start(placeholder, name, &self.events);
        let outcome = self.drive(&mut run).await;
        run.finish(outcome)
    }

    async fn drive(&self, run: &mut Run<'_>) -> LoadOutcome {
        let placeholder = run.placeholder;
        let id = &placeholder.file_id;

        run.enter(LoadPhase::CacheCheck);
        if let Some(file) = self.cached(placeholder) {
            run.enter(LoadPhase::Rendering);
            return self.render_from_cache(&file, placeholder);
        }

        run.enter(LoadPhase::InFlightCheck);
        if self.tracker.wait_on(placeholder) {
            return LoadOutcome::Skipped(SkipReason::AlreadyLoading);
        }

        run.enter(LoadPhase::Lookup);
        let found = self
            .collaborators
            .lookup
            .find_descriptor(id)
            .and_then(|d| d.ok_or_else(|| LoaderError::NotFound(id.clone())));
        let descriptor = match found {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(file_id = %id, error = %e, "descriptor lookup failed");
                return self.fail(run, FailureKind::LookupNotFound, true);
            }
        };

        run.enter(LoadPhase::CollisionCheck);
        match self.document.has_collapsible_media(id) {
            Ok(true) => {
                // The media may belong to an owner that has just cached it.
                if let Some(file) = self.cached(placeholder) {
                    run.enter(LoadPhase::Rendering);
                    return self.render_from_cache(&file, placeholder);
                }
                return LoadOutcome::Skipped(SkipReason::AlreadyRendered);
            }
            Ok(false) => {}
            Err(e) => warn!(file_id = %id, error = %e, "collision check failed, continuing"),
        }

        run.enter(LoadPhase::Admission);
        let guard = match self.tracker.admit(placeholder) {
            Admission::Owner(guard) => guard,
            Admission::Waiting => return LoadOutcome::Skipped(SkipReason::AlreadyLoading),
        };
        // An owner may have finished between our cache check and admission.
        if let Some(file) = self.cached(placeholder) {
            let waiters = guard.release();
            run.enter(LoadPhase::Rendering);
            return self.with_waiters(self.render_from_cache(&file, placeholder), &file, waiters);
        }

        self.load(run, &descriptor, guard).await
    }

    /// Download, decrypt, materialize, and render while owning the
    /// identifier. `guard` is released on every path.
    async fn load(
        &self,
        run: &mut Run<'_>,
        descriptor: &vellum_types::FileDescriptor,
        guard: InFlightGuard,
    ) -> LoadOutcome {
        let placeholder = run.placeholder;
        let id = &placeholder.file_id;

        run.enter(LoadPhase::Downloading);
        self.show(placeholder, Some(&format!("Downloading {}...", run.name)), false);
        self.pause().await;
        let item = match self.collaborators.downloader.download(descriptor).await {
            Ok(item) => item,
            Err(e) => {
                warn!(file_id = %id, error = %e, "download failed");
                drop(guard);
                return self.fail(run, FailureKind::DownloadFailed, false);
            }
        };

        run.enter(LoadPhase::Decrypting);
        self.show(placeholder, Some(&format!("Decrypting {}...", run.name)), false);
        self.pause().await;
        let payload = match self.collaborators.decryptor.decrypt(descriptor, item).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(file_id = %id, error = %e, "decryption failed");
                drop(guard);
                return self.fail(run, FailureKind::DecryptFailed, false);
            }
        };

        run.enter(LoadPhase::Materializing);
        self.show(placeholder, None, false);
        self.pause().await;
        let handle = match self
            .collaborators
            .materializer
            .materialize(&payload, &descriptor.media_type)
        {
            Ok(handle) => handle,
            Err(e) => {
                warn!(file_id = %id, error = %e, "materialization failed");
                drop(guard);
                return self.fail(run, FailureKind::MaterializeFailed, false);
            }
        };
        let file = ResolvedFile::new(handle, descriptor.media_type.clone(), run.name.clone());

        run.enter(LoadPhase::Rendering);
        let report = match self.dispatcher.render(self.document.as_ref(), &file, placeholder) {
            Ok(report) => report,
            Err(e) => {
                warn!(file_id = %id, error = %e, "render failed");
                self.collaborators.materializer.release(&file.handle);
                drop(guard);
                return self.fail(run, FailureKind::RenderFailed, false);
            }
        };

        // Untracked strictly before the cache is populated, with no window
        // where another resolve sees neither.
        let (waiters, stored) = guard.complete(self.cache.as_ref(), file.clone());
        match stored {
            Ok(Some(previous)) if previous.handle != file.handle => {
                self.collaborators.materializer.release(&previous.handle);
            }
            Ok(_) => {}
            Err(e) => warn!(file_id = %id, error = %e, "could not cache materialized file"),
        }

        let outcome = LoadOutcome::Rendered {
            node: report.node,
            source: RenderSource::Pipeline,
            waiters_served: 0,
        };
        self.with_waiters(outcome, &file, waiters)
    }

    fn cached(&self, placeholder: &PlaceholderRef) -> Option<ResolvedFile> {
        match self.cache.get(&placeholder.file_id) {
            Ok(hit) => hit,
            Err(e) => {
                warn!(file_id = %placeholder.file_id, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    fn render_from_cache(&self, file: &ResolvedFile, placeholder: &PlaceholderRef) -> LoadOutcome {
        match self.dispatcher.render(self.document.as_ref(), file, placeholder) {
            Ok(report) => LoadOutcome::Rendered {
                node: report.node,
                source: RenderSource::Cache,
                waiters_served: 0,
            },
            Err(e) => {
                warn!(file_id = %placeholder.file_id, error = %e, "render from cache failed");
                LoadOutcome::Failed(LoadFailure {
                    kind: FailureKind::RenderFailed,
                    phase: LoadPhase::Rendering,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Render `file` into placeholders that were parked while it loaded.
    fn with_waiters(
        &self,
        outcome: LoadOutcome,
        file: &ResolvedFile,
        waiters: Vec<PlaceholderRef>,
    ) -> LoadOutcome {
        let mut served = 0;
        for waiter in waiters {
            if !self.document.contains(waiter.node) {
                continue;
            }
            match self.dispatcher.render(self.document.as_ref(), file, &waiter) {
                Ok(_) => served += 1,
                Err(e) => warn!(file_id = %waiter.file_id, node = %waiter.node, error = %e, "waiter render failed"),
            }
        }
        match outcome {
            LoadOutcome::Rendered { node, source, .. } => LoadOutcome::Rendered {
                node,
                source,
                waiters_served: served,
            },
            other => other,
        }
    }

    /// Record a failure for the current phase and surface it as status text.
    fn fail(&self, run: &Run<'_>, kind: FailureKind, dismissable: bool) -> LoadOutcome {
        let id = &run.placeholder.file_id;
        let message = match kind {
            FailureKind::LookupNotFound => format!("Unable to find {} {}.", run.name, id),
            FailureKind::DownloadFailed => format!("Unable to download {} {}.", run.name, id),
            FailureKind::DecryptFailed => format!("Unable to decrypt {} {}.", run.name, id),
            FailureKind::MaterializeFailed | FailureKind::RenderFailed => {
                format!("Unable to load {} {}.", run.name, id)
            }
        };
        if kind == FailureKind::RenderFailed {
            // The placeholder is gone; there is nowhere to show the message.
            self.show(run.placeholder, None, false);
        } else {
            self.show(run.placeholder, Some(&message), dismissable);
        }
        LoadOutcome::Failed(LoadFailure {
            kind,
            phase: run.current,
            message,
        })
    }

    fn show(&self, placeholder: &PlaceholderRef, message: Option<&str>, dismissable: bool) {
        let key = StatusKey::File(placeholder.file_id.clone());
        if let Err(e) = self
            .status
            .set_status(&key, message, dismissable, Anchor::Node(placeholder.node))
        {
            warn!(file_id = %placeholder.file_id, error = %e, "status update failed");
        }
    }

    async fn pause(&self) {
        let delay = self.config.status_yield();
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }
    }
}

impl std::fmt::Debug for LoadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadPipeline")
            .field("in_flight", &self.tracker.len())
            .field("config", &self.config)
            .finish()
    }
}
