use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::file::FileId;

/// Metadata describing an encrypted file.
///
/// Descriptors are owned by the lookup collaborator and fetched afresh on
/// every resolution attempt. They are never cached by the loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// The file this descriptor describes.
    pub id: FileId,
    /// Declared media type of the plaintext (e.g. `image/png`).
    pub media_type: String,
    /// Size of the encrypted payload in bytes.
    pub size: u64,
    /// Where the encrypted bytes can be fetched from. Interpreted only by the
    /// download collaborator.
    #[serde(default)]
    pub locations: Vec<String>,
}

impl FileDescriptor {
    pub fn new(id: FileId, media_type: impl Into<String>) -> Self {
        Self {
            id,
            media_type: media_type.into(),
            size: 0,
            locations: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }
}

/// Encrypted bytes returned by the download collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedItem {
    pub id: FileId,
    pub data: Bytes,
}

/// Plaintext returned by the decryption collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedPayload {
    pub data: Bytes,
}

impl DecryptedPayload {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
