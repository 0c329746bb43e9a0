//! Node representation
//!
//! Compact arena handles plus the per-node payload. Elements keep an
//! ordered attribute list and a child vector; splicing children in and out
//! is the hot mutation path for marker wrap/unwrap.

/// Compact node identifier (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct Node {
    /// Parent node (None for the root, or for detached nodes)
    pub(crate) parent: Option<NodeId>,
    /// Node payload
    pub(crate) data: NodeData,
}

/// Node payload
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Element with tag name, ordered attributes, and children
    Element {
        /// Lowercase tag name
        name: String,
        /// Attributes in document order
        attrs: Vec<(String, String)>,
        /// Child nodes in document order
        children: Vec<NodeId>,
    },
    /// Text content
    Text(String),
}

impl Node {
    pub(crate) fn element(name: &str) -> Self {
        Node {
            parent: None,
            data: NodeData::Element {
                name: name.to_ascii_lowercase(),
                attrs: Vec::new(),
                children: Vec::new(),
            },
        }
    }

    pub(crate) fn text(content: &str) -> Self {
        Node {
            parent: None,
            data: NodeData::Text(content.to_string()),
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }
}
