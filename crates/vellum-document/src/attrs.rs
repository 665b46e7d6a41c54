//! Attribute and tag names shared by placeholders, rendered media, and
//! status elements.

/// Marks an element as a placeholder awaiting resolution.
pub const PLACEHOLDER: &str = "fsplaceholder";
/// File identifier carried by placeholders and rendered media.
pub const FILE_ID: &str = "fsid";
/// Raw file name carried by placeholders and rendered media.
pub const FILE_NAME: &str = "fsname";
/// Marks rendered media as collapsible (superseded by fresher renders).
pub const COLLAPSIBLE: &str = "fscollapsable";
/// Marks editor-ignored elements.
pub const GHOST: &str = "ghost";
pub const CONTENT_EDITABLE: &str = "contenteditable";
pub const ID: &str = "id";
pub const STYLE: &str = "style";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";

/// Tags that count as rendered media in collision checks.
pub const COLLAPSIBLE_MEDIA_TAGS: &[&str] = &["img", "figure", "video", "audio"];
