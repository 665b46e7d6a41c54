//! Object-URL style materializer.
//!
//! Each materialized payload is kept in a table under a fresh
//! `blob:vellum/<uuid>` URL until the handle is released.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;
use vellum_types::{DecryptedPayload, TempHandle};

use crate::collab::Materializer;
use crate::error::{LoaderError, LoaderResult};

const URL_PREFIX: &str = "blob:vellum/";

/// A stored blob: declared media type plus bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub media_type: String,
    pub data: Bytes,
}

/// Issues `blob:` URLs for decrypted payloads and serves them back.
#[derive(Debug, Default)]
pub struct BlobUrlMaterializer {
    blobs: RwLock<HashMap<String, Blob>>,
}

impl BlobUrlMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the blob behind a handle, if it has not been released.
    pub fn resolve(&self, handle: &TempHandle) -> Option<Blob> {
        self.blobs.read().ok()?.get(handle.url()).cloned()
    }

    /// Number of live blobs.
    pub fn live_count(&self) -> usize {
        self.blobs.read().map(|m| m.len()).unwrap_or(0)
    }
}

impl Materializer for BlobUrlMaterializer {
    fn materialize(&self, payload: &DecryptedPayload, media_type: &str) -> LoaderResult<TempHandle> {
        let url = format!("{URL_PREFIX}{}", Uuid::now_v7());
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| LoaderError::Materialize(e.to_string()))?;
        blobs.insert(
            url.clone(),
            Blob {
                media_type: media_type.to_string(),
                data: payload.data.clone(),
            },
        );
        debug!(%url, bytes = payload.len(), "blob materialized");
        Ok(TempHandle::new(url))
    }

    fn release(&self, handle: &TempHandle) {
        if let Ok(mut blobs) = self.blobs.write() {
            if blobs.remove(handle.url()).is_some() {
                debug!(url = handle.url(), "blob released");
            }
        }
    }
}
