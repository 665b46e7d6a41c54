//! High-level SDK for Vellum.
//!
//! [`FileLoader`] is the entry point for applications: hand it a document
//! and the external collaborators, then call [`FileLoader::load_all`] to
//! replace every encrypted media placeholder with rendered media.

pub mod error;
pub mod loader;

pub use error::{SdkError, SdkResult};
pub use loader::FileLoader;

// Re-export key types
pub use vellum_cache::{FileCache, InMemoryFileCache};
pub use vellum_document::{DocumentHost, Element, InMemoryDocument, PlacementPolicy};
pub use vellum_render::{RenderConfig, RenderDispatcher, RenderStrategy};
pub use vellum_loader::{
    BlobUrlMaterializer, Collaborators, Decryptor, DescriptorLookup, Downloader,
    InMemoryDescriptorIndex, LoadEvent, LoadOutcome, LoadReport, LoaderConfig, Materializer,
};
pub use vellum_types::{FileDescriptor, FileId, MediaKind, PlaceholderRef, StatusKey};
