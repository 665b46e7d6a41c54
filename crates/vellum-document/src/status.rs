//! Transient, human-readable progress indicators keyed by request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;
use vellum_types::{NodeId, StatusKey};

use crate::attrs;
use crate::element::Element;
use crate::error::DocumentResult;
use crate::host::{Anchor, DocumentHost};
use crate::placement::PlacementPolicy;

/// Creates and removes status elements in a document.
///
/// At most one status element is live per [`StatusKey`]: setting a status
/// removes whatever was previously shown for the key.
pub struct StatusReporter {
    document: Arc<dyn DocumentHost>,
    placement: PlacementPolicy,
    live: Mutex<HashMap<StatusKey, NodeId>>,
}

impl StatusReporter {
    pub fn new(document: Arc<dyn DocumentHost>, placement: PlacementPolicy) -> Self {
        Self {
            document,
            placement,
            live: Mutex::new(HashMap::new()),
        }
    }

    fn live(&self) -> MutexGuard<'_, HashMap<StatusKey, NodeId>> {
        self.live.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the status shown for `key`.
    ///
    /// Any existing element for `key` is removed first. With `Some(message)`
    /// a new element is inserted near `anchor` and returned; with `None` the
    /// call only removes. Dismissable statuses are fully selectable so users
    /// can delete them.
    pub fn set_status(
        &self,
        key: &StatusKey,
        message: Option<&str>,
        dismissable: bool,
        anchor: Anchor,
    ) -> DocumentResult<Option<NodeId>> {
        let mut live = self.live();
        if let Some(previous) = live.remove(key) {
            self.document.remove(previous)?;
        }
        let Some(message) = message else {
            debug!(%key, "status cleared");
            return Ok(None);
        };

        let node = self
            .placement
            .insert_near(self.document.as_ref(), status_element(key, message, dismissable), anchor)?;
        debug!(%key, %message, "status set");
        live.insert(key.clone(), node);
        Ok(Some(node))
    }

    /// Remove the status for `key`, if any.
    pub fn clear(&self, key: &StatusKey) -> DocumentResult<()> {
        self.set_status(key, None, false, Anchor::Cursor).map(|_| ())
    }

    /// Show a status at the document cursor under a fresh synthetic key.
    pub fn insert_at_cursor(&self, message: &str) -> DocumentResult<StatusKey> {
        let key = StatusKey::synthetic();
        self.set_status(&key, Some(message), false, Anchor::Cursor)?;
        Ok(key)
    }

    /// Remove the status element carrying `key` as its id.
    ///
    /// The element is located in the document by id rather than through a
    /// held reference, since hosts may have re-inserted it as raw markup.
    pub fn remove_by_key(&self, key: &StatusKey) -> DocumentResult<bool> {
        self.live().remove(key);
        match self.document.find_by_id(key.as_str())? {
            Some(node) => self.document.remove(node),
            None => Ok(false),
        }
    }

    /// Node currently showing the status for `key`.
    pub fn node_for(&self, key: &StatusKey) -> Option<NodeId> {
        self.live().get(key).copied()
    }

    /// Number of live status entries.
    pub fn live_count(&self) -> usize {
        self.live().len()
    }

    /// Remove every live status element.
    pub fn reset(&self) -> DocumentResult<()> {
        let drained: Vec<NodeId> = self.live().drain().map(|(_, node)| node).collect();
        for node in drained {
            self.document.remove(node)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter")
            .field("live", &self.live_count())
            .finish()
    }
}

fn status_element(key: &StatusKey, message: &str, dismissable: bool) -> Element {
    let style = if dismissable {
        "font-weight: bold; user-select: all;"
    } else {
        "font-weight: bold;"
    };
    Element::new("label")
        .attr(attrs::ID, key.as_str())
        .attr(attrs::GHOST, "true")
        .attr(attrs::CONTENT_EDITABLE, "false")
        .attr(attrs::STYLE, style)
        .text(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDocument;
    use vellum_types::FileId;

    fn setup() -> (Arc<InMemoryDocument>, StatusReporter, NodeId) {
        let doc = Arc::new(InMemoryDocument::new());
        let anchor = doc
            .append(doc.root(), Element::new("span").attr(attrs::PLACEHOLDER, "true"))
            .unwrap();
        let reporter = StatusReporter::new(doc.clone(), PlacementPolicy::default());
        (doc, reporter, anchor)
    }

    fn key(s: &str) -> StatusKey {
        StatusKey::File(FileId::new(s).unwrap())
    }

    fn labels(doc: &InMemoryDocument) -> Vec<String> {
        doc.find_by_tag("label")
            .into_iter()
            .map(|n| doc.element(n).unwrap().text.unwrap_or_default())
            .collect()
    }

    #[test]
    fn set_creates_element_near_anchor() {
        let (doc, reporter, anchor) = setup();
        let node = reporter
            .set_status(&key("abc"), Some("Downloading file..."), false, Anchor::Node(anchor))
            .unwrap()
            .unwrap();
        let el = doc.element(node).unwrap();
        assert_eq!(el.get_attr(attrs::ID), Some("abc"));
        assert_eq!(el.get_attr(attrs::GHOST), Some("true"));
        assert_eq!(el.get_attr(attrs::STYLE), Some("font-weight: bold;"));
        assert_eq!(doc.children(doc.root()).unwrap(), vec![node, anchor]);
    }

    #[test]
    fn setting_again_replaces_previous() {
        let (doc, reporter, anchor) = setup();
        let k = key("abc");
        reporter.set_status(&k, Some("Downloading a..."), false, Anchor::Node(anchor)).unwrap();
        reporter.set_status(&k, Some("Decrypting a..."), false, Anchor::Node(anchor)).unwrap();
        assert_eq!(labels(&doc), vec!["Decrypting a...".to_string()]);
        assert_eq!(reporter.live_count(), 1);
    }

    #[test]
    fn none_message_only_removes() {
        let (doc, reporter, anchor) = setup();
        let k = key("abc");
        reporter.set_status(&k, Some("x"), false, Anchor::Node(anchor)).unwrap();
        let out = reporter.set_status(&k, None, false, Anchor::Node(anchor)).unwrap();
        assert!(out.is_none());
        assert!(labels(&doc).is_empty());
        assert!(reporter.node_for(&k).is_none());
    }

    #[test]
    fn clear_without_entry_is_noop() {
        let (doc, reporter, _) = setup();
        reporter.clear(&key("nothing")).unwrap();
        assert_eq!(doc.node_count(), 2);
    }

    #[test]
    fn dismissable_status_is_selectable() {
        let (doc, reporter, anchor) = setup();
        let node = reporter
            .set_status(&key("abc"), Some("Unable to find file abc."), true, Anchor::Node(anchor))
            .unwrap()
            .unwrap();
        assert_eq!(
            doc.element(node).unwrap().get_attr(attrs::STYLE),
            Some("font-weight: bold; user-select: all;")
        );
    }

    #[test]
    fn cursor_status_round_trip() {
        let (doc, reporter, _) = setup();
        let k = reporter.insert_at_cursor("Uploading...").unwrap();
        assert!(matches!(k, StatusKey::Synthetic(_)));
        assert_eq!(labels(&doc), vec!["Uploading...".to_string()]);

        assert!(reporter.remove_by_key(&k).unwrap());
        assert!(labels(&doc).is_empty());
        assert!(!reporter.remove_by_key(&k).unwrap());
    }

    #[test]
    fn remove_by_key_finds_elements_never_tracked() {
        let (doc, reporter, _) = setup();
        doc.append(doc.root(), Element::new("label").attr(attrs::ID, "raw-1"))
            .unwrap();
        let k = StatusKey::Synthetic("raw-1".into());
        assert!(reporter.remove_by_key(&k).unwrap());
        assert!(doc.find_by_id("raw-1").unwrap().is_none());
    }

    #[test]
    fn reset_removes_everything() {
        let (doc, reporter, anchor) = setup();
        reporter.set_status(&key("a"), Some("a"), false, Anchor::Node(anchor)).unwrap();
        reporter.set_status(&key("b"), Some("b"), false, Anchor::Node(anchor)).unwrap();
        reporter.reset().unwrap();
        assert!(labels(&doc).is_empty());
        assert_eq!(reporter.live_count(), 0);
    }
}
