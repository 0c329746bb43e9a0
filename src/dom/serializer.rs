//! Markup writer
//!
//! Serializes a subtree back to markup. Text and attribute values are
//! escaped with html-escape; void elements are written self-closing.

use super::document::Document;
use super::node::NodeId;
use super::parser::is_void_element;

/// Serialize a node (element or text) including its own tag.
pub fn serialize(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

/// Serialize only the children of a node, concatenated.
pub fn inner_markup(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for &child in doc.children(node) {
        write_node(doc, child, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    if let Some(text) = doc.text(node) {
        out.push_str(&html_escape::encode_text(text));
        return;
    }
    let Some(name) = doc.tag_name(node) else {
        return;
    };
    out.push('<');
    out.push_str(name);
    for (key, value) in doc.attributes(node) {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    if is_void_element(name) && doc.children(node).is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for &child in doc.children(node) {
        write_node(doc, child, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
