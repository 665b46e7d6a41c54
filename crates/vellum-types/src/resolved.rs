use std::fmt;

use serde::{Deserialize, Serialize};

use crate::media::{MediaKind, MediaTypeMap};

/// Temporary addressable handle for decrypted bytes (an object URL or
/// equivalent). Handles must be released through the materializer that
/// issued them once they are no longer referenced.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TempHandle(String);

impl TempHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The addressable location of the handle.
    pub fn url(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TempHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TempHandle({})", self.0)
    }
}

impl fmt::Display for TempHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The end product of a resolution: what the cache stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFile {
    pub handle: TempHandle,
    /// Media type declared by the descriptor at resolution time.
    pub media_type: String,
    /// Label shown to users (already passed through the fallback rule).
    pub display_name: String,
}

impl ResolvedFile {
    pub fn new(
        handle: TempHandle,
        media_type: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            handle,
            media_type: media_type.into(),
            display_name: display_name.into(),
        }
    }

    /// Presentation kind under the given media type table.
    pub fn kind(&self, map: &MediaTypeMap) -> MediaKind {
        map.kind_for(&self.media_type)
    }
}
