use thiserror::Error;
use vellum_document::DocumentError;
use vellum_types::{MediaKind, NodeId};

/// Errors from render dispatch.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The placeholder left the document before its media could be placed.
    #[error("placeholder {0} is no longer in the document")]
    PlaceholderDetached(NodeId),

    /// No strategy is registered for the kind, not even a download fallback.
    #[error("no render strategy for {0}")]
    NoStrategy(MediaKind),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

/// Result alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
