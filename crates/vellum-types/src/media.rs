use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a resolved file is presented in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Inline image.
    Image,
    /// Video with playback controls.
    Video,
    /// Audio with playback controls.
    Audio,
    /// Generic downloadable link. Used for every unrecognized media type.
    Download,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Download => "download",
        };
        f.write_str(s)
    }
}

/// Built-in media type table.
const BUILTIN_MEDIA_TYPES: &[(&str, MediaKind)] = &[
    ("image/png", MediaKind::Image),
    ("image/jpg", MediaKind::Image),
    ("image/jpeg", MediaKind::Image),
    ("image/gif", MediaKind::Image),
    ("image/tiff", MediaKind::Image),
    ("image/bmp", MediaKind::Image),
    ("video/mp4", MediaKind::Video),
    ("audio/mpeg", MediaKind::Audio),
    ("audio/mp3", MediaKind::Audio),
];

/// Case-insensitive mapping from declared media type to [`MediaKind`].
///
/// Unknown types map to [`MediaKind::Download`]. Keys are stored lowercased.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTypeMap {
    entries: BTreeMap<String, MediaKind>,
}

impl MediaTypeMap {
    /// An empty map: every type renders as a download.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The built-in table of image, video, and audio types.
    pub fn builtin() -> Self {
        let entries = BUILTIN_MEDIA_TYPES
            .iter()
            .map(|(ty, kind)| ((*ty).to_string(), *kind))
            .collect();
        Self { entries }
    }

    /// Register (or replace) a mapping.
    pub fn insert(&mut self, media_type: &str, kind: MediaKind) {
        self.entries
            .insert(media_type.trim().to_ascii_lowercase(), kind);
    }

    /// Layer `overrides` on top of this map. Later entries win.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a MediaKind)>,
    ) -> Self {
        for (ty, kind) in overrides {
            self.insert(ty, *kind);
        }
        self
    }

    /// Resolve the kind for a declared media type.
    pub fn kind_for(&self, media_type: &str) -> MediaKind {
        self.entries
            .get(&media_type.trim().to_ascii_lowercase())
            .copied()
            .unwrap_or(MediaKind::Download)
    }

    /// Number of registered media types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no media types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MediaTypeMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builtin_table() {
        let map = MediaTypeMap::builtin();
        assert_eq!(map.kind_for("image/png"), MediaKind::Image);
        assert_eq!(map.kind_for("image/bmp"), MediaKind::Image);
        assert_eq!(map.kind_for("video/mp4"), MediaKind::Video);
        assert_eq!(map.kind_for("audio/mp3"), MediaKind::Audio);
        assert_eq!(map.kind_for("audio/mpeg"), MediaKind::Audio);
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn unknown_types_are_downloads() {
        let map = MediaTypeMap::builtin();
        assert_eq!(map.kind_for("application/pdf"), MediaKind::Download);
        assert_eq!(map.kind_for(""), MediaKind::Download);
        assert_eq!(MediaTypeMap::empty().kind_for("image/png"), MediaKind::Download);
    }

    #[test]
    fn overrides_replace_builtin_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert("image/png".to_string(), MediaKind::Download);
        overrides.insert("video/WEBM".to_string(), MediaKind::Video);
        let map = MediaTypeMap::builtin().with_overrides(&overrides);
        assert_eq!(map.kind_for("image/png"), MediaKind::Download);
        assert_eq!(map.kind_for("video/webm"), MediaKind::Video);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&MediaKind::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }

    proptest! {
        #[test]
        fn lookup_ignores_case(idx in 0usize..BUILTIN_MEDIA_TYPES.len(), mask in proptest::collection::vec(any::<bool>(), 16)) {
            let (ty, kind) = BUILTIN_MEDIA_TYPES[idx];
            let mixed: String = ty
                .chars()
                .enumerate()
                .map(|(i, c)| if mask[i % mask.len()] { c.to_ascii_uppercase() } else { c })
                .collect();
            prop_assert_eq!(MediaTypeMap::builtin().kind_for(&mixed), kind);
        }
    }
}
