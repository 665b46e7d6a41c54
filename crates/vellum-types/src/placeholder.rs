use std::fmt;

use serde::{Deserialize, Serialize};

use crate::file::FileId;

/// Literal some editors write into the name attribute when no name was set.
const UNDEFINED_NAME: &str = "undefined";

/// Default label used in user-visible messages when a file has no name.
pub const DEFAULT_FALLBACK_NAME: &str = "file";

/// Handle to a node inside a document host.
///
/// Node ids are issued by the document and are only meaningful to the
/// document that issued them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Optional rendering hints declared on a placeholder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHints {
    pub width: Option<String>,
    pub height: Option<String>,
}

impl RenderHints {
    /// Dimensions are propagated only when a width is declared.
    pub fn has_dimensions(&self) -> bool {
        self.width.is_some()
    }
}

/// A document-embedded marker awaiting replacement by resolved media.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// The placeholder node in the document.
    pub node: NodeId,
    pub file_id: FileId,
    /// Raw name as written in the document, if any.
    pub name: Option<String>,
    pub hints: RenderHints,
}

impl PlaceholderRef {
    pub fn new(node: NodeId, file_id: FileId) -> Self {
        Self {
            node,
            file_id,
            name: None,
            hints: RenderHints::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_hints(mut self, hints: RenderHints) -> Self {
        self.hints = hints;
        self
    }

    /// Label to show users for this placeholder.
    pub fn display_name(&self, fallback: &str) -> String {
        display_name(self.name.as_deref(), fallback)
    }
}

/// Apply the fallback rule: absent, empty, or the literal `"undefined"`
/// yields `fallback`.
pub fn display_name(raw: Option<&str>, fallback: &str) -> String {
    match raw {
        Some(name) if !name.is_empty() && name != UNDEFINED_NAME => name.to_string(),
        _ => fallback.to_string(),
    }
}
