//! Marker materialization and removal
//!
//! Converts a logical span into DOM mutations and reverses them by id.
//! The split/wrap/unwrap sequences are inherently imperative tree
//! surgery; keeping them behind these few functions leaves the matching
//! side pure.
//!
//! There is no fatal error path here. A span that overlaps nothing means
//! the index and document disagree, and the call reports `false` without
//! touching the tree; removal of an id with no markers is a successful
//! no-op.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::dom::{Document, NodeId};
use crate::highlight::index::TextIndex;
use crate::highlight::types::{Span, MARKER_TAG};

/// Wrap the text within `span` in marker elements carrying `id` and
/// `class`, splitting text nodes at the span boundaries.
///
/// One marker is created per overlapped text node, so a highlight
/// crossing inline formatting boundaries yields several markers sharing
/// the same identity attribute. Returns `false` (and mutates nothing)
/// when the span overlaps no indexed node.
pub fn apply_at_span(
    doc: &mut Document,
    index: &TextIndex,
    span: Span,
    marker_attr: &str,
    id: i64,
    class: &str,
) -> bool {
    if span.is_empty() {
        return false;
    }

    let mut wrapped = 0usize;
    for seg in index.segments() {
        // half-open overlap test
        if !(seg.start < span.end && seg.end > span.start) {
            continue;
        }
        // tolerate nodes detached by external scripts since the index
        // was built
        if doc.parent(seg.node).is_none() || !doc.is_text(seg.node) {
            trace!(id, "skipping detached or replaced text node");
            continue;
        }

        let local_start = span.start.saturating_sub(seg.start);
        let local_end = span.end.min(seg.end) - seg.start;

        let mut target = seg.node;
        if local_start > 0 {
            target = doc.split_text(target, local_start);
        }
        let keep = local_end - local_start;
        if keep < doc.text_len_chars(target) {
            doc.split_text(target, keep);
        }

        let marker = doc.create_element(MARKER_TAG);
        doc.set_attribute(marker, marker_attr, &id.to_string());
        doc.set_attribute(marker, "class", class);
        doc.wrap(target, marker);
        wrapped += 1;
    }

    debug!(id, start = span.start, end = span.end, wrapped, "applied highlight span");
    wrapped > 0
}

/// All marker elements carrying `id`, in document order.
pub fn markers_with_id(doc: &Document, marker_attr: &str, id: i64) -> Vec<NodeId> {
    let wanted = id.to_string();
    doc.descendants(doc.root())
        .filter(|&n| doc.attribute(n, marker_attr) == Some(wanted.as_str()))
        .collect()
}

/// Distinct highlight ids currently rendered, in document order of first
/// appearance.
pub fn marker_ids(doc: &Document, marker_attr: &str) -> Vec<i64> {
    let mut ids = Vec::new();
    for node in doc.descendants(doc.root()) {
        if let Some(value) = doc.attribute(node, marker_attr) {
            if let Ok(id) = value.parse::<i64>() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

/// Remove every marker carrying `id`: children are spliced back into the
/// parent in place and affected parents are normalized, so a subsequent
/// index build sees merged text exactly as if the marker never existed.
///
/// Idempotent: zero matches is a successful no-op. Returns the number of
/// markers removed.
pub fn remove_by_id(doc: &mut Document, marker_attr: &str, id: i64) -> usize {
    let markers = markers_with_id(doc, marker_attr, id);
    let mut parents: HashSet<NodeId> = HashSet::new();
    for marker in &markers {
        if let Some(parent) = doc.parent(*marker) {
            parents.insert(parent);
        }
        doc.unwrap(*marker);
    }
    for parent in parents {
        doc.normalize(parent);
    }
    debug!(id, removed = markers.len(), "removed highlight markers");
    markers.len()
}

/// Rewrite the presentation class on every marker carrying `id` without
/// re-resolving its position. The cheap path for color or comment-only
/// edits. Returns the number of markers touched.
pub fn set_presentation_class(
    doc: &mut Document,
    marker_attr: &str,
    id: i64,
    class: &str,
) -> usize {
    let markers = markers_with_id(doc, marker_attr, id);
    for &marker in &markers {
        doc.set_attribute(marker, "class", class);
    }
    markers.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_fragment;
    use crate::highlight::types::{ExclusionRules, MARKER_ATTR};
    use crate::highlight::TextIndex;

    fn build(markup: &str) -> (Document, TextIndex) {
        let doc = parse_fragment(markup).unwrap();
        let index = TextIndex::build(&doc, doc.root(), &ExclusionRules::default());
        (doc, index)
    }

    fn filtered_text(doc: &Document) -> String {
        TextIndex::build(doc, doc.root(), &ExclusionRules::default())
            .text()
            .to_string()
    }

    #[test]
    fn test_apply_wraps_single_node() {
        let (mut doc, index) = build("<p>The quick brown fox</p>");
        assert!(apply_at_span(&mut doc, &index, Span::new(4, 15), MARKER_ATTR, 1, "hl"));

        let markers = markers_with_id(&doc, MARKER_ATTR, 1);
        assert_eq!(markers.len(), 1);
        assert_eq!(doc.text_content(markers[0]), "quick brown");
        // wrapped text is excluded from a fresh index
        assert_eq!(filtered_text(&doc), "The  fox");
    }

    #[test]
    fn test_apply_at_node_start_skips_first_split() {
        let (mut doc, index) = build("<p>quick brown fox</p>");
        assert!(apply_at_span(&mut doc, &index, Span::new(0, 5), MARKER_ATTR, 1, "hl"));
        let markers = markers_with_id(&doc, MARKER_ATTR, 1);
        assert_eq!(doc.text_content(markers[0]), "quick");
    }

    #[test]
    fn test_apply_to_node_end_skips_second_split() {
        let (mut doc, index) = build("<p>quick brown</p>");
        assert!(apply_at_span(&mut doc, &index, Span::new(6, 11), MARKER_ATTR, 1, "hl"));
        let markers = markers_with_id(&doc, MARKER_ATTR, 1);
        assert_eq!(doc.text_content(markers[0]), "brown");
    }

    #[test]
    fn test_apply_across_inline_boundary_creates_one_marker_per_node() {
        let (mut doc, index) = build("<p>The <b>quick</b> brown</p>");
        // "quick brown" spans the <b> text node and the following one
        assert!(apply_at_span(&mut doc, &index, Span::new(4, 15), MARKER_ATTR, 7, "hl"));

        let markers = markers_with_id(&doc, MARKER_ATTR, 7);
        assert_eq!(markers.len(), 2);
        let joined: String = markers.iter().map(|&m| doc.text_content(m)).collect();
        assert_eq!(joined, "quick brown");
    }

    #[test]
    fn test_apply_out_of_bounds_is_rejected_without_mutation() {
        let (mut doc, index) = build("<p>short</p>");
        let before = crate::dom::inner_markup(&doc, doc.root());
        assert!(!apply_at_span(&mut doc, &index, Span::new(50, 60), MARKER_ATTR, 1, "hl"));
        assert!(!apply_at_span(&mut doc, &index, Span::new(3, 3), MARKER_ATTR, 1, "hl"));
        assert_eq!(crate::dom::inner_markup(&doc, doc.root()), before);
    }

    #[test]
    fn test_remove_restores_single_text_node() {
        let (mut doc, index) = build("<p>The quick brown fox</p>");
        apply_at_span(&mut doc, &index, Span::new(4, 15), MARKER_ATTR, 1, "hl");
        assert_eq!(remove_by_id(&mut doc, MARKER_ATTR, 1), 1);

        let p = doc.children(doc.root())[0];
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "The quick brown fox");
        assert!(markers_with_id(&doc, MARKER_ATTR, 1).is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut doc, _) = build("<p>plain</p>");
        let before = crate::dom::inner_markup(&doc, doc.root());
        assert_eq!(remove_by_id(&mut doc, MARKER_ATTR, 99), 0);
        assert_eq!(crate::dom::inner_markup(&doc, doc.root()), before);
    }

    #[test]
    fn test_remove_only_touches_matching_id() {
        let (mut doc, index) = build("<p>alpha beta gamma</p>");
        apply_at_span(&mut doc, &index, Span::new(0, 5), MARKER_ATTR, 1, "hl");
        let index2 = TextIndex::build(&doc, doc.root(), &ExclusionRules::default());
        let span = index2.find_span("gamma").unwrap();
        apply_at_span(&mut doc, &index2, span, MARKER_ATTR, 2, "hl");

        remove_by_id(&mut doc, MARKER_ATTR, 1);
        assert!(markers_with_id(&doc, MARKER_ATTR, 1).is_empty());
        assert_eq!(markers_with_id(&doc, MARKER_ATTR, 2).len(), 1);
        assert_eq!(filtered_text(&doc), "alpha beta ");
    }

    #[test]
    fn test_marker_ids_lists_each_id_once() {
        let (mut doc, index) = build("<p>The <b>quick</b> brown fox</p>");
        // two markers for id 1, one for id 2
        apply_at_span(&mut doc, &index, Span::new(4, 15), MARKER_ATTR, 1, "hl");
        let index2 = TextIndex::build(&doc, doc.root(), &ExclusionRules::default());
        let span = index2.find_span("fox").unwrap();
        apply_at_span(&mut doc, &index2, span, MARKER_ATTR, 2, "hl");

        assert_eq!(marker_ids(&doc, MARKER_ATTR), vec![1, 2]);
    }

    #[test]
    fn test_set_presentation_class_rewrites_all_markers() {
        let (mut doc, index) = build("<p>The <b>quick</b> brown</p>");
        apply_at_span(&mut doc, &index, Span::new(4, 15), MARKER_ATTR, 7, "old");
        assert_eq!(set_presentation_class(&mut doc, MARKER_ATTR, 7, "new"), 2);
        for m in markers_with_id(&doc, MARKER_ATTR, 7) {
            assert_eq!(doc.attribute(m, "class"), Some("new"));
        }
    }
}
