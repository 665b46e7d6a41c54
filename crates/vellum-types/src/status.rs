use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::file::FileId;

/// Key under which a transient status element is tracked.
///
/// File-bound statuses are keyed by the file identifier; cursor statuses
/// (not tied to any file) get a synthetic key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKey {
    File(FileId),
    Synthetic(String),
}

impl StatusKey {
    /// A fresh synthetic key. Prefixed so it is a valid element id.
    pub fn synthetic() -> Self {
        Self::Synthetic(format!("vs{}", Uuid::now_v7().simple()))
    }

    /// The string written into the status element's `id`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::File(id) => id.as_str(),
            Self::Synthetic(key) => key,
        }
    }
}

impl From<FileId> for StatusKey {
    fn from(id: FileId) -> Self {
        Self::File(id)
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
