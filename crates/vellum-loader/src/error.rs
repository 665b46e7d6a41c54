use thiserror::Error;
use vellum_types::FileId;

/// Errors from the load pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// No descriptor exists for the identifier.
    #[error("no descriptor for file {0}")]
    NotFound(FileId),

    /// The download collaborator failed.
    #[error("download of {id} failed: {reason}")]
    Download { id: FileId, reason: String },

    /// The decryption collaborator failed.
    #[error("decryption of {id} failed: {reason}")]
    Decrypt { id: FileId, reason: String },

    /// A temporary handle could not be created.
    #[error("materialization failed: {0}")]
    Materialize(String),

    /// The descriptor lookup backend failed.
    #[error("descriptor lookup failed: {0}")]
    Lookup(String),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cache error: {0}")]
    Cache(#[from] vellum_cache::CacheError),

    #[error("document error: {0}")]
    Document(#[from] vellum_document::DocumentError),

    #[error("render error: {0}")]
    Render(#[from] vellum_render::RenderError),
}

/// Result alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
