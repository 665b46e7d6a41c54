use vellum_document::Element;
use vellum_types::{FileId, MediaKind, PlaceholderRef, ResolvedFile};

use crate::config::RenderConfig;

// ---------------------------------------------------------------------------
// RenderRequest
// ---------------------------------------------------------------------------

/// Everything a strategy needs to build an element for one placeholder.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    pub file: &'a ResolvedFile,
    pub placeholder: &'a PlaceholderRef,
}

impl<'a> RenderRequest<'a> {
    pub fn new(file: &'a ResolvedFile, placeholder: &'a PlaceholderRef) -> Self {
        Self { file, placeholder }
    }

    pub fn file_id(&self) -> &FileId {
        &self.placeholder.file_id
    }

    pub fn url(&self) -> &str {
        self.file.handle.url()
    }

    pub fn display_name(&self) -> &str {
        &self.file.display_name
    }
}

// ---------------------------------------------------------------------------
// RenderStrategy trait
// ---------------------------------------------------------------------------

/// Builds the element for one [`MediaKind`].
///
/// Strategies only construct detached elements; placement and placeholder
/// removal are the dispatcher's job. The trait is object-safe so strategies
/// can be stored in a `Vec<Box<dyn RenderStrategy>>`.
pub trait RenderStrategy: Send + Sync {
    /// Human-readable name of this strategy (e.g., "image").
    fn name(&self) -> &str;

    /// The media kind this strategy renders.
    fn kind(&self) -> MediaKind;

    /// Build the element to insert.
    fn build(&self, request: &RenderRequest<'_>, config: &RenderConfig) -> Element;
}
