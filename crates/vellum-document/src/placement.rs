//! Structural placement of inserted elements.
//!
//! Some document models forbid certain nestings (a `figure` inside a `p`,
//! a `p` inside another `p`). When the element to insert is not allowed
//! below one of the anchor's ancestors, it is placed immediately after the
//! outermost such ancestor instead of next to the anchor.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::element::Element;
use crate::error::DocumentResult;
use crate::host::{Anchor, DocumentHost, InsertMode};
use vellum_types::NodeId;

/// `child` elements may not appear anywhere below a `forbidden_ancestor`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestingRule {
    pub child: String,
    pub forbidden_ancestor: String,
}

impl NestingRule {
    pub fn new(child: impl Into<String>, forbidden_ancestor: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            forbidden_ancestor: forbidden_ancestor.into(),
        }
    }

    fn forbids(&self, child: &str, ancestor: &str) -> bool {
        self.child.eq_ignore_ascii_case(child)
            && self.forbidden_ancestor.eq_ignore_ascii_case(ancestor)
    }
}

/// Nesting rules of the target document model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementPolicy {
    pub rules: Vec<NestingRule>,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            rules: vec![NestingRule::new("figure", "p"), NestingRule::new("p", "p")],
        }
    }
}

impl PlacementPolicy {
    /// A policy with no nesting restrictions.
    pub fn unrestricted() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: NestingRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn forbids(&self, child: &str, ancestor: &str) -> bool {
        self.rules.iter().any(|r| r.forbids(child, ancestor))
    }

    /// Decide where an element with tag `tag` goes when inserted near
    /// `anchor`.
    pub fn target(
        &self,
        document: &dyn DocumentHost,
        tag: &str,
        anchor: NodeId,
    ) -> DocumentResult<(NodeId, InsertMode)> {
        if !self.rules.iter().any(|r| r.child.eq_ignore_ascii_case(tag)) {
            return Ok((anchor, InsertMode::Child));
        }
        let lineage = document.lineage(anchor)?;
        let outermost = lineage
            .iter()
            .rev()
            .find(|(_, ancestor)| self.forbids(tag, ancestor));
        Ok(match outermost {
            Some((ancestor, _)) => (*ancestor, InsertMode::After),
            None => (anchor, InsertMode::Child),
        })
    }

    /// Preprocess `element` through the host, then insert it near `anchor`
    /// according to this policy. Returns the inserted node.
    pub fn insert_near(
        &self,
        document: &dyn DocumentHost,
        element: Element,
        anchor: Anchor,
    ) -> DocumentResult<NodeId> {
        let processed = document.preprocess(element);
        let (anchor, mode) = match anchor {
            Anchor::Cursor => (Anchor::Cursor, InsertMode::Child),
            Anchor::Node(node) => {
                let (target, mode) = self.target(document, &processed.tag, node)?;
                (Anchor::Node(target), mode)
            }
        };
        debug!(tag = %processed.tag, ?anchor, ?mode, "placing element");
        document.insert_adjacent(processed, anchor, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDocument;

    fn doc_with_paragraph() -> (InMemoryDocument, NodeId, NodeId) {
        let doc = InMemoryDocument::new();
        let p = doc.append(doc.root(), Element::new("p")).unwrap();
        let span = doc.append(p, Element::new("span")).unwrap();
        (doc, p, span)
    }

    #[test]
    fn unrestricted_tags_go_beside_anchor() {
        let (doc, _, span) = doc_with_paragraph();
        let policy = PlacementPolicy::default();
        assert_eq!(policy.target(&doc, "img", span).unwrap(), (span, InsertMode::Child));
    }

    #[test]
    fn figure_escapes_paragraph() {
        let (doc, p, span) = doc_with_paragraph();
        let policy = PlacementPolicy::default();
        assert_eq!(policy.target(&doc, "figure", span).unwrap(), (p, InsertMode::After));
    }

    #[test]
    fn figure_outside_paragraph_stays() {
        let doc = InMemoryDocument::new();
        let div = doc.append(doc.root(), Element::new("div")).unwrap();
        let span = doc.append(div, Element::new("span")).unwrap();
        let policy = PlacementPolicy::default();
        assert_eq!(policy.target(&doc, "figure", span).unwrap(), (span, InsertMode::Child));
    }

    #[test]
    fn outermost_forbidden_ancestor_wins() {
        let doc = InMemoryDocument::new();
        let outer = doc.append(doc.root(), Element::new("p")).unwrap();
        let inner = doc.append(outer, Element::new("p")).unwrap();
        let span = doc.append(inner, Element::new("span")).unwrap();
        let policy = PlacementPolicy::default();
        assert_eq!(policy.target(&doc, "p", span).unwrap(), (outer, InsertMode::After));
    }

    #[test]
    fn insert_near_uses_preprocessed_tag() {
        let doc = InMemoryDocument::new().with_preprocessor(|el| {
            if el.is("img") {
                Element::new("figure").child(el)
            } else {
                el
            }
        });
        let p = doc.append(doc.root(), Element::new("p")).unwrap();
        let span = doc.append(p, Element::new("span")).unwrap();

        let node = PlacementPolicy::default()
            .insert_near(&doc, Element::new("img"), Anchor::Node(span))
            .unwrap();
        assert_eq!(doc.parent(node).unwrap(), Some(doc.root()));
        assert_eq!(doc.children(doc.root()).unwrap(), vec![p, node]);
        assert!(doc.element(node).unwrap().is("figure"));
    }

    #[test]
    fn custom_rules_round_trip() {
        let policy = PlacementPolicy::unrestricted().with_rule(NestingRule::new("table", "li"));
        let json = serde_json::to_string(&policy).unwrap();
        let parsed: PlacementPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
}
