//! Headless DOM substrate
//!
//! A small arena-backed document tree, just enough DOM for the highlight
//! engine: element and text nodes, in-place mutation (split, wrap, unwrap,
//! normalize), document-order traversal, and attribute/class lookups.
//!
//! Nodes are addressed by [`NodeId`] handles into the arena. Detaching a
//! node never frees it; it simply becomes unreachable from the root, which
//! keeps every outstanding handle valid.

mod document;
mod node;
mod parser;
mod serializer;

pub use document::{Ancestors, Descendants, Document};
pub use node::{Node, NodeData, NodeId};
pub use parser::parse_fragment;
pub use serializer::{inner_markup, serialize};
