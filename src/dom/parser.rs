//! Markup loader
//!
//! Parses an (X)HTML fragment into a [`Document`] rooted at a synthetic
//! `body` element. Built on quick-xml's event reader; entity references are
//! decoded with html-escape so page text like `&nbsp;` survives, not just
//! the five XML entities.
//!
//! The loader is deliberately lenient about real-world page markup:
//! - void elements (`<br>`, `<img>`, ...) written as start tags are
//!   accepted and treated as empty
//! - stray or mismatched end tags are skipped
//! - comments, doctype, declarations, and processing instructions are
//!   dropped

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::document::Document;
use super::node::NodeId;
use crate::error::Result;

/// HTML elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub(crate) fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Parse a markup fragment into a new document.
pub fn parse_fragment(input: &str) -> Result<Document> {
    let mut doc = Document::new();
    let mut reader = Reader::from_str(input);
    // end tags are matched against our own element stack so that void
    // elements written as start tags do not desync the parse
    reader.check_end_names(false);

    let mut stack: Vec<NodeId> = vec![doc.root()];

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let parent = *stack.last().unwrap_or(&doc.root());
                let node = open_element(&mut doc, parent, &e)?;
                let name = doc.tag_name(node).unwrap_or_default().to_string();
                if !is_void_element(&name) {
                    stack.push(node);
                }
            }
            Event::Empty(e) => {
                let parent = *stack.last().unwrap_or(&doc.root());
                open_element(&mut doc, parent, &e)?;
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                // close the nearest matching open element; ignore stray
                // end tags and never pop the synthetic root
                if let Some(pos) = stack
                    .iter()
                    .rposition(|&n| doc.tag_name(n) == Some(name.as_str()))
                {
                    if pos > 0 {
                        stack.truncate(pos);
                    }
                }
            }
            Event::Text(t) => {
                let raw = String::from_utf8_lossy(&t);
                let text = html_escape::decode_html_entities(raw.as_ref()).into_owned();
                if !text.is_empty() {
                    let parent = *stack.last().unwrap_or(&doc.root());
                    let node = doc.create_text(&text);
                    doc.append_child(parent, node);
                }
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                if !text.is_empty() {
                    let parent = *stack.last().unwrap_or(&doc.root());
                    let node = doc.create_text(&text);
                    doc.append_child(parent, node);
                }
            }
            Event::Eof => break,
            // comments, doctype, declarations, processing instructions
            _ => {}
        }
    }

    Ok(doc)
}

fn open_element(doc: &mut Document, parent: NodeId, e: &BytesStart<'_>) -> Result<NodeId> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    let node = doc.create_element(&name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = html_escape::decode_html_entities(raw.as_ref()).into_owned();
        doc.set_attribute(node, &key, &value);
    }
    doc.append_child(parent, node);
    Ok(node)
}
