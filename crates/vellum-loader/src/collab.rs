//! Interfaces of the external collaborators the pipeline drives.

use std::sync::Arc;

use async_trait::async_trait;
use vellum_types::{DecryptedPayload, EncryptedItem, FileDescriptor, FileId, TempHandle};

use crate::error::LoaderResult;

/// Finds the descriptor of an encrypted file.
///
/// Lookup is synchronous: the pipeline performs it before registering the
/// identifier as in flight, with no suspension point in between.
pub trait DescriptorLookup: Send + Sync {
    /// Returns `Ok(None)` when no descriptor exists.
    fn find_descriptor(&self, id: &FileId) -> LoaderResult<Option<FileDescriptor>>;
}

/// Fetches encrypted bytes.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, descriptor: &FileDescriptor) -> LoaderResult<EncryptedItem>;
}

/// Decrypts downloaded bytes.
#[async_trait]
pub trait Decryptor: Send + Sync {
    async fn decrypt(
        &self,
        descriptor: &FileDescriptor,
        item: EncryptedItem,
    ) -> LoaderResult<DecryptedPayload>;
}

/// Turns decrypted bytes into a directly renderable temporary handle.
pub trait Materializer: Send + Sync {
    fn materialize(&self, payload: &DecryptedPayload, media_type: &str) -> LoaderResult<TempHandle>;

    /// Release a handle previously returned by [`Materializer::materialize`].
    fn release(&self, _handle: &TempHandle) {}
}

/// The set of collaborators one pipeline drives.
#[derive(Clone)]
pub struct Collaborators {
    pub lookup: Arc<dyn DescriptorLookup>,
    pub downloader: Arc<dyn Downloader>,
    pub decryptor: Arc<dyn Decryptor>,
    pub materializer: Arc<dyn Materializer>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
