use thiserror::Error;

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A thread panicked while holding the cache lock.
    #[error("cache lock poisoned: {0}")]
    Poisoned(String),

    /// The backing store refused the operation.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
