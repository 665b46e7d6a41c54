use vellum_types::{FileId, NodeId, PlaceholderRef};

use crate::element::Element;
use crate::error::DocumentResult;

/// Where an inserted element goes relative to its anchor node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertMode {
    /// As a child of the anchor's parent, directly in front of the anchor.
    Child,
    /// Immediately after the anchor, as its next sibling.
    After,
}

/// Insertion reference point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// Next to a node in the document.
    Node(NodeId),
    /// At the document's current cursor position.
    Cursor,
}

/// The document being resolved.
///
/// This is the only surface through which the loader touches the document.
/// Implementations wrap whatever editing model the host application uses.
pub trait DocumentHost: Send + Sync {
    /// Every placeholder currently in the document, in document order.
    ///
    /// Scanning is restartable: calling it again after mutations returns the
    /// placeholders still present.
    fn scan_placeholders(&self) -> DocumentResult<Vec<PlaceholderRef>>;

    /// Give the host a chance to rewrite an element before insertion.
    ///
    /// Callers must continue with the returned element, not their input.
    fn preprocess(&self, element: Element) -> Element {
        element
    }

    /// Insert `element` relative to `anchor`. Returns the new node.
    fn insert_adjacent(
        &self,
        element: Element,
        anchor: Anchor,
        mode: InsertMode,
    ) -> DocumentResult<NodeId>;

    /// Remove a node and its subtree. Returns `false` if it was already gone.
    fn remove(&self, node: NodeId) -> DocumentResult<bool>;

    /// Whether `node` is still attached to the document.
    fn contains(&self, node: NodeId) -> bool;

    /// `node` and its ancestors with their tag names, nearest first.
    fn lineage(&self, node: NodeId) -> DocumentResult<Vec<(NodeId, String)>>;

    /// Find a node by its `id` attribute.
    fn find_by_id(&self, id: &str) -> DocumentResult<Option<NodeId>>;

    /// Whether a rendered, collapsible media element already exists for
    /// `file_id`.
    fn has_collapsible_media(&self, file_id: &FileId) -> DocumentResult<bool>;
}
