use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("load task failed: {0}")]
    Task(String),

    #[error("cache error: {0}")]
    Cache(#[from] vellum_cache::CacheError),

    #[error("document error: {0}")]
    Document(#[from] vellum_document::DocumentError),

    #[error("loader error: {0}")]
    Loader(#[from] vellum_loader::LoaderError),
}

pub type SdkResult<T> = Result<T, SdkError>;
