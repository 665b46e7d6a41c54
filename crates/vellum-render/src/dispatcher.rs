use tracing::{debug, warn};
use vellum_document::{Anchor, DocumentHost, PlacementPolicy};
use vellum_types::{MediaKind, MediaTypeMap, NodeId, PlaceholderRef, ResolvedFile};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::strategies::{AudioStrategy, DownloadStrategy, ImageStrategy, VideoStrategy};
use crate::strategy::{RenderRequest, RenderStrategy};

// ---------------------------------------------------------------------------
// RenderReport
// ---------------------------------------------------------------------------

/// Outcome of a successful render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderReport {
    /// The inserted element (after host preprocessing).
    pub node: NodeId,
    /// The kind the media type mapped to.
    pub kind: MediaKind,
    /// Name of the strategy that built the element.
    pub strategy: String,
}

// ---------------------------------------------------------------------------
// RenderDispatcher
// ---------------------------------------------------------------------------

/// Maps a resolved file's media kind to a strategy, inserts the result next
/// to the placeholder, then removes the placeholder.
pub struct RenderDispatcher {
    strategies: Vec<Box<dyn RenderStrategy>>,
    media_types: MediaTypeMap,
    placement: PlacementPolicy,
    config: RenderConfig,
}

impl RenderDispatcher {
    /// Create a dispatcher with no strategies.
    pub fn new(config: RenderConfig, placement: PlacementPolicy) -> Self {
        Self {
            strategies: Vec::new(),
            media_types: config.media_type_map(),
            placement,
            config,
        }
    }

    /// Create a dispatcher with image, video, audio, and download strategies.
    pub fn with_default_strategies(config: RenderConfig, placement: PlacementPolicy) -> Self {
        let mut dispatcher = Self::new(config, placement);
        dispatcher.add_strategy(Box::new(ImageStrategy));
        dispatcher.add_strategy(Box::new(VideoStrategy));
        dispatcher.add_strategy(Box::new(AudioStrategy));
        dispatcher.add_strategy(Box::new(DownloadStrategy));
        dispatcher
    }

    /// Register a strategy. A later strategy for the same kind takes
    /// precedence over earlier ones.
    pub fn add_strategy(&mut self, strategy: Box<dyn RenderStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn media_types(&self) -> &MediaTypeMap {
        &self.media_types
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    fn strategy_for(&self, kind: MediaKind) -> RenderResult<&dyn RenderStrategy> {
        let find = |k: MediaKind| self.strategies.iter().rev().find(|s| s.kind() == k);
        find(kind)
            .or_else(|| find(MediaKind::Download))
            .map(|s| s.as_ref())
            .ok_or(RenderError::NoStrategy(kind))
    }

    /// Render `file` in place of `placeholder`.
    pub fn render(
        &self,
        document: &dyn DocumentHost,
        file: &ResolvedFile,
        placeholder: &PlaceholderRef,
    ) -> RenderResult<RenderReport> {
        if !document.contains(placeholder.node) {
            return Err(RenderError::PlaceholderDetached(placeholder.node));
        }

        let kind = file.kind(&self.media_types);
        let strategy = self.strategy_for(kind)?;
        let request = RenderRequest::new(file, placeholder);
        let element = strategy.build(&request, &self.config);

        let node = self
            .placement
            .insert_near(document, element, Anchor::Node(placeholder.node))?;
        if let Err(e) = document.remove(placeholder.node) {
            // Undo the insertion so no media outlives a failed render.
            if let Err(rollback) = document.remove(node) {
                warn!(node = %node, error = %rollback, "could not roll back inserted media");
            }
            return Err(e.into());
        }

        debug!(
            file_id = %placeholder.file_id,
            %kind,
            strategy = strategy.name(),
            node = %node,
            "placeholder replaced"
        );

        Ok(RenderReport {
            node,
            kind,
            strategy: strategy.name().to_string(),
        })
    }
}
