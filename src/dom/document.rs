//! Mutable document tree
//!
//! The arena owns every node; handles stay valid for the document's
//! lifetime. Operations on detached nodes, or on ids that do not belong
//! to this arena at all, are no-ops (reads treat them as absent) rather
//! than panics, so a tree mutated underneath us by an external party is
//! tolerated.

use super::node::{Node, NodeData, NodeId};

/// An arena-backed document tree.
///
/// Fragments are rooted at a synthetic `body` element; parse with
/// [`crate::dom::parse_fragment`] or build programmatically.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create an empty document with a `body` root element.
    pub fn new() -> Self {
        let root = Node::element("body");
        Document {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Parse a markup fragment into a new document.
    pub fn parse(input: &str) -> crate::error::Result<Self> {
        super::parser::parse_fragment(input)
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Check whether an id belongs to this document's arena.
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a detached element node.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Append `child` as the last child of `parent`. No-op if `parent` is
    /// not an element of this arena.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) {
            return;
        }
        self.detach(child);
        let appended = match self.node_mut(parent).map(|n| &mut n.data) {
            Some(NodeData::Element { children, .. }) => {
                children.push(child);
                true
            }
            _ => false,
        };
        if appended {
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(parent);
            }
        }
    }

    /// Insert `new` into `parent`'s children immediately before
    /// `reference`. No-op if `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, new: NodeId, reference: NodeId) {
        if !self.contains(parent) || !self.contains(new) {
            return;
        }
        self.detach(new);
        let inserted = match self.node_mut(parent).map(|n| &mut n.data) {
            Some(NodeData::Element { children, .. }) => {
                match children.iter().position(|&c| c == reference) {
                    Some(pos) => {
                        children.insert(pos, new);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };
        if inserted {
            if let Some(node) = self.node_mut(new) {
                node.parent = Some(parent);
            }
        }
    }

    /// Detach a node from its parent. The node stays in the arena and its
    /// handle stays valid; it is simply no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(NodeData::Element { children, .. }) =
            self.node_mut(parent).map(|n| &mut n.data)
        {
            children.retain(|&c| c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of an element (empty for text nodes and unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { children, .. }) => children,
            _ => &[],
        }
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Length of a text node in Unicode scalar values. Zero for elements.
    pub fn text_len_chars(&self, id: NodeId) -> usize {
        self.text(id).map_or(0, |s| s.chars().count())
    }

    /// Check whether a node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_element)
    }

    /// Check whether a node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_text)
    }

    /// Attribute value on an element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set (or replace) an attribute on an element. No-op on text nodes
    /// and unknown ids.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(NodeData::Element { attrs, .. }) = self.node_mut(id).map(|n| &mut n.data) {
            if let Some(entry) = attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
                entry.1 = value.to_string();
            } else {
                attrs.push((name.to_ascii_lowercase(), value.to_string()));
            }
        }
    }

    /// Remove an attribute from an element.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(NodeData::Element { attrs, .. }) = self.node_mut(id).map(|n| &mut n.data) {
            attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    /// Attributes of an element in document order.
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match self.node(id).map(|n| &n.data) {
            Some(NodeData::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    /// Check whether an element's `class` attribute contains `class`
    /// (whitespace-separated token match).
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attribute(id, "class")
            .map_or(false, |v| v.split_ascii_whitespace().any(|c| c == class))
    }

    /// Concatenated text of a subtree, unfiltered.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for n in self.descendants(id) {
            if let Some(t) = self.text(n) {
                out.push_str(t);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Pre-order (document order) traversal of a subtree, including `root`.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![root],
        }
    }

    /// Ancestors of a node, nearest first, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            cur: self.parent(id),
        }
    }

    // ------------------------------------------------------------------
    // Tree surgery
    // ------------------------------------------------------------------

    /// Split a text node at a character offset, leaving the first `offset`
    /// characters in place and returning the new right-hand node inserted
    /// after it.
    ///
    /// Returns the original node unchanged when the offset is 0 or past
    /// the end, when the node is not text, or when it is detached or
    /// unknown.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> NodeId {
        if offset == 0 || self.parent(id).is_none() {
            return id;
        }
        let byte = match self.text(id) {
            Some(s) => match s.char_indices().nth(offset) {
                Some((b, _)) => b,
                None => return id,
            },
            None => return id,
        };
        let right = match self.node_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Text(s)) => s.split_off(byte),
            _ => return id,
        };
        let new = self.create_text(&right);
        // insert the right half immediately after the original
        let Some(parent) = self.parent(id) else {
            return id;
        };
        let inserted = match self.node_mut(parent).map(|n| &mut n.data) {
            Some(NodeData::Element { children, .. }) => {
                match children.iter().position(|&c| c == id) {
                    Some(pos) => {
                        children.insert(pos + 1, new);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        };
        if inserted {
            if let Some(node) = self.node_mut(new) {
                node.parent = Some(parent);
            }
        }
        new
    }

    /// Replace `target` with `wrapper` at its position, then move `target`
    /// inside `wrapper`. No-op if `target` is detached or either id is
    /// unknown.
    pub fn wrap(&mut self, target: NodeId, wrapper: NodeId) {
        let Some(parent) = self.parent(target) else {
            return;
        };
        if !self.contains(wrapper) {
            return;
        }
        self.insert_before(parent, wrapper, target);
        self.append_child(wrapper, target);
    }

    /// Move all of `wrapper`'s children into its parent at the wrapper's
    /// position, then detach the wrapper. No-op if detached or unknown.
    pub fn unwrap(&mut self, wrapper: NodeId) {
        let Some(parent) = self.parent(wrapper) else {
            return;
        };
        let moved: Vec<NodeId> = match self.node_mut(wrapper).map(|n| &mut n.data) {
            Some(NodeData::Element { children, .. }) => std::mem::take(children),
            _ => return,
        };
        let pos = match self.node(parent).map(|n| &n.data) {
            Some(NodeData::Element { children, .. }) => {
                children.iter().position(|&c| c == wrapper)
            }
            _ => None,
        };
        let Some(pos) = pos else {
            return;
        };
        if let Some(NodeData::Element { children, .. }) =
            self.node_mut(parent).map(|n| &mut n.data)
        {
            children.remove(pos);
            for (i, &child) in moved.iter().enumerate() {
                children.insert(pos + i, child);
            }
        }
        for &child in &moved {
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(parent);
            }
        }
        if let Some(node) = self.node_mut(wrapper) {
            node.parent = None;
        }
    }

    /// Merge adjacent text children of `parent` and drop empty text
    /// children, so a later traversal sees the text exactly as if no
    /// splitting ever happened.
    pub fn normalize(&mut self, parent: NodeId) {
        let mut i = 0;
        loop {
            let kids = self.children(parent);
            if i >= kids.len() {
                break;
            }
            let cur = kids[i];
            if let Some(t) = self.text(cur) {
                if t.is_empty() {
                    self.detach(cur);
                    continue;
                }
                if i + 1 < kids.len() {
                    let next = kids[i + 1];
                    if let Some(nt) = self.text(next) {
                        let merged = nt.to_string();
                        if let Some(NodeData::Text(s)) = self.node_mut(cur).map(|n| &mut n.data) {
                            s.push_str(&merged);
                        }
                        self.detach(next);
                        continue;
                    }
                }
            }
            i += 1;
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Pre-order subtree iterator.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = self.doc.children(id);
        for &child in children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

/// Parent-chain iterator, nearest ancestor first.
pub struct Ancestors<'a> {
    doc: &'a Document,
    cur: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.doc.parent(id);
        Some(id)
    }
}
