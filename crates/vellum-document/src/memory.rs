//! In-memory document tree for tests and headless embedding.
//!
//! [`InMemoryDocument`] stores nodes in an arena behind a `RwLock` and
//! implements the full [`DocumentHost`] trait. Node ids are never reused.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;
use vellum_types::{FileId, NodeId, PlaceholderRef, RenderHints};

use crate::attrs;
use crate::element::Element;
use crate::error::{DocumentError, DocumentResult};
use crate::host::{Anchor, DocumentHost, InsertMode};

type Preprocessor = Box<dyn Fn(Element) -> Element + Send + Sync>;

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    cursor: NodeId,
    next_id: u64,
}

impl Tree {
    fn node(&self, id: NodeId) -> DocumentResult<&Node> {
        self.nodes.get(&id).ok_or(DocumentError::NodeNotFound(id))
    }

    /// Add `element` (recursively) as a detached subtree; returns its root.
    fn build(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                tag: element.tag,
                attrs: element.attrs,
                text: element.text,
                parent,
                children: Vec::new(),
            },
        );
        let children: Vec<NodeId> = element
            .children
            .into_iter()
            .map(|child| self.build(child, Some(id)))
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        id
    }

    fn insert_at(&mut self, element: Element, parent: NodeId, index: usize) -> NodeId {
        let id = self.build(element, Some(parent));
        if let Some(p) = self.nodes.get_mut(&parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, id);
        }
        id
    }

    /// Nodes in document (pre-)order.
    fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn snapshot(&self, id: NodeId) -> DocumentResult<Element> {
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .map(|c| self.snapshot(*c))
            .collect::<DocumentResult<Vec<_>>>()?;
        Ok(Element {
            tag: node.tag.clone(),
            attrs: node.attrs.clone(),
            text: node.text.clone(),
            children,
        })
    }

    fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.nodes.get(&c).and_then(|n| n.parent);
        }
        false
    }

    fn write_markup(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let _ = write!(out, "<{}", node.tag);
        for (name, value) in &node.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if is_void(&node.tag) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape(text));
        }
        for child in &node.children {
            self.write_markup(*child, out);
        }
        let _ = write!(out, "</{}>", node.tag);
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "source" | "br")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// An arena-backed document tree implementing [`DocumentHost`].
pub struct InMemoryDocument {
    tree: RwLock<Tree>,
    preprocessor: Option<Preprocessor>,
}

impl InMemoryDocument {
    /// Create a document containing only an empty `body` root. The cursor
    /// starts at the root.
    pub fn new() -> Self {
        let root = NodeId::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                tag: "body".into(),
                attrs: BTreeMap::new(),
                text: None,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            tree: RwLock::new(Tree {
                nodes,
                root,
                cursor: root,
                next_id: 1,
            }),
            preprocessor: None,
        }
    }

    /// Install a preprocessing hook applied by [`DocumentHost::preprocess`].
    pub fn with_preprocessor(
        mut self,
        f: impl Fn(Element) -> Element + Send + Sync + 'static,
    ) -> Self {
        self.preprocessor = Some(Box::new(f));
        self
    }

    fn read(&self) -> DocumentResult<RwLockReadGuard<'_, Tree>> {
        self.tree
            .read()
            .map_err(|e| DocumentError::Poisoned(e.to_string()))
    }

    fn write(&self) -> DocumentResult<RwLockWriteGuard<'_, Tree>> {
        self.tree
            .write()
            .map_err(|e| DocumentError::Poisoned(e.to_string()))
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.read().map(|t| t.root).unwrap_or(NodeId::new(0))
    }

    /// Append `element` as the last child of `parent`.
    pub fn append(&self, parent: NodeId, element: Element) -> DocumentResult<NodeId> {
        let mut tree = self.write()?;
        let index = tree.node(parent)?.children.len();
        Ok(tree.insert_at(element, parent, index))
    }

    /// Move the cursor. Cursor insertions append to this node.
    pub fn set_cursor(&self, node: NodeId) -> DocumentResult<()> {
        let mut tree = self.write()?;
        tree.node(node)?;
        tree.cursor = node;
        Ok(())
    }

    /// Snapshot of a node and its subtree.
    pub fn element(&self, node: NodeId) -> DocumentResult<Element> {
        self.read()?.snapshot(node)
    }

    /// Parent of a node.
    pub fn parent(&self, node: NodeId) -> DocumentResult<Option<NodeId>> {
        Ok(self.read()?.node(node)?.parent)
    }

    /// Children of a node, in order.
    pub fn children(&self, node: NodeId) -> DocumentResult<Vec<NodeId>> {
        Ok(self.read()?.node(node)?.children.clone())
    }

    /// Attribute value on a node.
    pub fn attr(&self, node: NodeId, name: &str) -> DocumentResult<Option<String>> {
        Ok(self.read()?.node(node)?.attrs.get(name).cloned())
    }

    /// All nodes with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let Ok(tree) = self.read() else {
            return Vec::new();
        };
        tree.preorder()
            .into_iter()
            .filter(|id| tree.nodes.get(id).is_some_and(|n| n.tag.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Number of attached nodes, root included.
    pub fn node_count(&self) -> usize {
        self.read().map(|t| t.nodes.len()).unwrap_or(0)
    }

    /// Serialize the children of the root as markup.
    pub fn to_markup(&self) -> String {
        let Ok(tree) = self.read() else {
            return String::new();
        };
        let mut out = String::new();
        if let Some(root) = tree.nodes.get(&tree.root) {
            for child in &root.children {
                tree.write_markup(*child, &mut out);
            }
        }
        out
    }
}

impl Default for InMemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocument")
            .field("node_count", &self.node_count())
            .field("preprocessor", &self.preprocessor.is_some())
            .finish()
    }
}

impl DocumentHost for InMemoryDocument {
    fn scan_placeholders(&self) -> DocumentResult<Vec<PlaceholderRef>> {
        let tree = self.read()?;
        let mut found = Vec::new();
        for id in tree.preorder() {
            let Some(node) = tree.nodes.get(&id) else {
                continue;
            };
            if !node.attrs.contains_key(attrs::PLACEHOLDER) {
                continue;
            }
            let raw_id = node.attrs.get(attrs::FILE_ID).map(String::as_str).unwrap_or("");
            let file_id = match FileId::new(raw_id) {
                Ok(file_id) => file_id,
                Err(_) => {
                    warn!(node = %id, "placeholder without a file identifier skipped");
                    continue;
                }
            };
            let hints = RenderHints {
                width: node.attrs.get(attrs::WIDTH).cloned(),
                height: node.attrs.get(attrs::HEIGHT).cloned(),
            };
            let mut placeholder = PlaceholderRef::new(id, file_id).with_hints(hints);
            placeholder.name = node.attrs.get(attrs::FILE_NAME).cloned();
            found.push(placeholder);
        }
        Ok(found)
    }

    fn preprocess(&self, element: Element) -> Element {
        match &self.preprocessor {
            Some(f) => f(element),
            None => element,
        }
    }

    fn insert_adjacent(
        &self,
        element: Element,
        anchor: Anchor,
        mode: InsertMode,
    ) -> DocumentResult<NodeId> {
        let mut tree = self.write()?;
        let anchor = match anchor {
            Anchor::Cursor => {
                let cursor = tree.cursor;
                let index = tree.node(cursor)?.children.len();
                return Ok(tree.insert_at(element, cursor, index));
            }
            Anchor::Node(node) => node,
        };
        let parent = tree
            .node(anchor)?
            .parent
            .ok_or(DocumentError::NoParent(anchor))?;
        let position = tree
            .node(parent)?
            .children
            .iter()
            .position(|c| *c == anchor)
            .ok_or(DocumentError::NodeNotFound(anchor))?;
        let index = match mode {
            InsertMode::Child => position,
            InsertMode::After => position + 1,
        };
        Ok(tree.insert_at(element, parent, index))
    }

    fn remove(&self, node: NodeId) -> DocumentResult<bool> {
        let mut tree = self.write()?;
        if node == tree.root {
            return Err(DocumentError::NoParent(node));
        }
        let Some(parent) = tree.nodes.get(&node).and_then(|n| n.parent) else {
            return Ok(false);
        };
        if tree.is_within(tree.cursor, node) {
            tree.cursor = parent;
        }
        if let Some(p) = tree.nodes.get_mut(&parent) {
            p.children.retain(|c| *c != node);
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = tree.nodes.remove(&id) {
                stack.extend(removed.children);
            }
        }
        Ok(true)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.read().is_ok_and(|t| t.nodes.contains_key(&node))
    }

    fn lineage(&self, node: NodeId) -> DocumentResult<Vec<(NodeId, String)>> {
        let tree = self.read()?;
        let mut out = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let n = tree.node(id)?;
            out.push((id, n.tag.clone()));
            current = n.parent;
        }
        Ok(out)
    }

    fn find_by_id(&self, id: &str) -> DocumentResult<Option<NodeId>> {
        let tree = self.read()?;
        Ok(tree.preorder().into_iter().find(|n| {
            tree.nodes
                .get(n)
                .and_then(|node| node.attrs.get(attrs::ID))
                .is_some_and(|v| v == id)
        }))
    }

    fn has_collapsible_media(&self, file_id: &FileId) -> DocumentResult<bool> {
        let tree = self.read()?;
        Ok(tree.nodes.values().any(|n| {
            attrs::COLLAPSIBLE_MEDIA_TAGS.contains(&n.tag.as_str())
                && n.attrs.contains_key(attrs::COLLAPSIBLE)
                && n.attrs.get(attrs::FILE_ID).is_some_and(|v| v == file_id.as_str())
        }))
    }
}
