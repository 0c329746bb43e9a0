//! Filtered text index and span matching
//!
//! Builds an order-preserving text representation of the document with
//! script/style subtrees, the toolbox UI, and existing highlight markers
//! filtered out, then locates a target substring inside it.
//!
//! All offsets are Unicode scalar (char) counts within the filtered
//! concatenation. This logical coordinate space is the only one shared
//! between persisted offsets and live positions; it is not the same as
//! raw `text_content` indices because excluded subtrees contribute
//! nothing.
//!
//! The index describes a snapshot of the tree. Every apply/match call
//! rebuilds it, because inserting a marker changes the tree the index
//! describes.

use tracing::{debug, warn};

use crate::dom::{Document, NodeId};
use crate::highlight::types::{ExclusionRules, Highlight, Span};

/// One contributing text node and its `[start, end)` range within the
/// logical string.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// The text node
    pub node: NodeId,
    /// Logical start offset (inclusive)
    pub start: usize,
    /// Logical end offset (exclusive)
    pub end: usize,
}

/// The filtered, order-preserving text of a document subtree.
#[derive(Debug, Clone)]
pub struct TextIndex {
    text: String,
    segments: Vec<Segment>,
    char_len: usize,
}

/// Check whether a text node contributes to the logical string: no
/// element on its ancestor chain may carry an excluded tag name, the
/// toolbox UI class, or the marker identity attribute.
///
/// Pure predicate over an explicit exclusion set so it can be exercised
/// against fixture trees without a browser.
pub fn is_indexable(doc: &Document, node: NodeId, rules: &ExclusionRules) -> bool {
    if !doc.is_text(node) {
        return false;
    }
    for ancestor in doc.ancestors(node) {
        let Some(tag) = doc.tag_name(ancestor) else {
            continue;
        };
        if rules.excluded_tags.iter().any(|t| t == tag) {
            return false;
        }
        if doc.has_class(ancestor, &rules.ui_class) {
            return false;
        }
        if doc.attribute(ancestor, &rules.marker_attr).is_some() {
            return false;
        }
    }
    true
}

impl TextIndex {
    /// Build the index over the subtree under `root`.
    pub fn build(doc: &Document, root: NodeId, rules: &ExclusionRules) -> Self {
        let mut text = String::new();
        let mut segments = Vec::new();
        let mut offset = 0usize;

        for node in doc.descendants(root) {
            if !is_indexable(doc, node, rules) {
                continue;
            }
            let Some(content) = doc.text(node) else {
                continue;
            };
            let len = content.chars().count();
            if len == 0 {
                continue;
            }
            text.push_str(content);
            segments.push(Segment {
                node,
                start: offset,
                end: offset + len,
            });
            offset += len;
        }

        TextIndex {
            text,
            segments,
            char_len: offset,
        }
    }

    /// The logical string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Contributing text nodes in document order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Locate `target` in the logical string: exact substring first, then
    /// case-insensitive. Returns the leftmost match only; multiple
    /// identical occurrences are not disambiguated.
    pub fn find_span(&self, target: &str) -> Option<Span> {
        if target.is_empty() {
            return None;
        }
        if let Some(byte_pos) = self.text.find(target) {
            let start = self.text[..byte_pos].chars().count();
            return Some(Span::new(start, start + target.chars().count()));
        }
        self.find_span_case_insensitive(target)
    }

    /// Case-insensitive fallback. Folding can change character counts
    /// (e.g. 'İ' lowers to two scalars), so the fold keeps a map from
    /// each folded character back to the original character index and the
    /// returned span is always in original coordinates.
    fn find_span_case_insensitive(&self, target: &str) -> Option<Span> {
        let mut lowered = String::with_capacity(self.text.len());
        let mut origin: Vec<usize> = Vec::with_capacity(self.text.len());
        for (i, ch) in self.text.chars().enumerate() {
            for folded in ch.to_lowercase() {
                lowered.push(folded);
                origin.push(i);
            }
        }

        let needle = target.to_lowercase();
        let byte_pos = lowered.find(&needle)?;
        let fold_start = lowered[..byte_pos].chars().count();
        let fold_len = needle.chars().count();
        if fold_len == 0 || fold_start + fold_len > origin.len() {
            return None;
        }
        let start = origin[fold_start];
        let end = origin[fold_start + fold_len - 1] + 1;
        Some(Span::new(start, end))
    }

    /// Resolve a highlight to a span against this index.
    ///
    /// Text-first: the stored `text` is searched before the stored
    /// offsets are trusted, which is what lets highlights survive minor
    /// page edits. Only when the text is empty or absent do the stored
    /// offsets get treated as logical coordinates against this fresh
    /// index, clamped to bounds (best-effort; may land on the wrong text
    /// if the page changed materially).
    pub fn resolve(&self, highlight: &Highlight) -> Option<Span> {
        if !highlight.text.is_empty() {
            if let Some(span) = self.find_span(&highlight.text) {
                return Some(span);
            }
            debug!(
                id = highlight.id,
                "highlight text not found, falling back to stored offsets"
            );
        }

        let start = highlight.start_offset;
        let end = highlight.end_offset;
        if start >= end || start >= self.char_len {
            warn!(
                id = highlight.id,
                start, end, "stored offsets unusable against current document"
            );
            return None;
        }
        Some(Span::new(start, end.min(self.char_len)))
    }
}
