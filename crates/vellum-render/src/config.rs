use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vellum_types::{MediaKind, MediaTypeMap};

/// Configuration for render dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Media type mappings layered over the built-in table.
    pub media_types: BTreeMap<String, MediaKind>,
    /// Block container wrapped around video and audio so the host does not
    /// wrap them itself.
    pub wrapper_tag: String,
    /// Whether images carry a `srcset` entry for 2x displays.
    pub image_srcset: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            media_types: BTreeMap::new(),
            wrapper_tag: "p".into(),
            image_srcset: true,
        }
    }
}

impl RenderConfig {
    /// The effective media type table: built-ins plus overrides.
    pub fn media_type_map(&self) -> MediaTypeMap {
        MediaTypeMap::builtin().with_overrides(&self.media_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RenderConfig::default();
        assert_eq!(c.wrapper_tag, "p");
        assert!(c.image_srcset);
        assert_eq!(c.media_type_map().kind_for("video/mp4"), MediaKind::Video);
    }

    #[test]
    fn overrides_apply() {
        let mut c = RenderConfig::default();
        c.media_types.insert("audio/ogg".into(), MediaKind::Audio);
        assert_eq!(c.media_type_map().kind_for("AUDIO/OGG"), MediaKind::Audio);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let c: RenderConfig = serde_json::from_str(r#"{"image_srcset":false}"#).unwrap();
        assert!(!c.image_srcset);
        assert_eq!(c.wrapper_tag, "p");
    }
}
