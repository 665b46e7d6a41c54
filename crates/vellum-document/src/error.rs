use thiserror::Error;
use vellum_types::NodeId;

/// Errors from document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The node is not (or no longer) part of the document.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Insertion next to the node needs a parent, and it has none.
    #[error("node {0} has no parent")]
    NoParent(NodeId),

    /// A thread panicked while holding the document lock.
    #[error("document lock poisoned: {0}")]
    Poisoned(String),
}

/// Result alias for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;
