//! Per-page highlight session
//!
//! The entry point the supervisory layer drives: one session per loaded
//! page context, owning the page document and the exclusion rules. No
//! state is carried between calls beyond the document itself; every
//! projection re-derives its index from a fresh traversal.

use tracing::debug;

use crate::dom::{Document, NodeId};
use crate::highlight::index::TextIndex;
use crate::highlight::marker;
use crate::highlight::types::{presentation_class, Color, ExclusionRules, Highlight};

/// A highlight projection session over one page document.
#[derive(Debug)]
pub struct HighlightSession {
    doc: Document,
    rules: ExclusionRules,
}

impl HighlightSession {
    /// Create a session with the default exclusion rules.
    pub fn new(doc: Document) -> Self {
        Self::with_rules(doc, ExclusionRules::default())
    }

    /// Create a session with explicit exclusion rules.
    pub fn with_rules(doc: Document, rules: ExclusionRules) -> Self {
        Self { doc, rules }
    }

    /// The page document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for callers that manage the page tree themselves.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Give the document back, consuming the session.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Project a single highlight onto the document.
    ///
    /// The span is resolved text-first against a freshly built index, so
    /// earlier projections cannot skew this one's coordinates. Returns
    /// `false` when the highlight cannot currently be rendered (text
    /// absent and stored offsets unusable); that is a degraded state the
    /// caller tolerates, not an error.
    pub fn project_highlight(&mut self, highlight: &Highlight) -> bool {
        let index = TextIndex::build(&self.doc, self.doc.root(), &self.rules);
        let Some(span) = index.resolve(highlight) else {
            debug!(id = highlight.id, "highlight not projectable onto current document");
            return false;
        };
        let class = highlight.presentation_class();
        marker::apply_at_span(
            &mut self.doc,
            &index,
            span,
            &self.rules.marker_attr,
            highlight.id,
            &class,
        )
    }

    /// Project a set of highlights in ascending `start_offset` order.
    ///
    /// Each highlight is independently re-resolved against the document
    /// state at the time of its own application; the ordering is a
    /// presentation convenience, not a correctness requirement. Returns
    /// the number of highlights actually rendered.
    pub fn project_highlights(&mut self, highlights: &[Highlight]) -> usize {
        let mut ordered: Vec<&Highlight> = highlights.iter().collect();
        ordered.sort_by_key(|h| h.start_offset);
        ordered
            .into_iter()
            .filter(|h| self.project_highlight(h))
            .count()
    }

    /// Remove a highlight's markers. Idempotent; returns the number of
    /// markers removed.
    pub fn unproject_highlight(&mut self, id: i64) -> usize {
        marker::remove_by_id(&mut self.doc, &self.rules.marker_attr, id)
    }

    /// Update the presentation class on an existing highlight's markers
    /// without re-resolving its position. Returns `false` when no marker
    /// with that id exists.
    pub fn reproject_presentation(&mut self, id: i64, color: Color, has_comment: bool) -> bool {
        let class = presentation_class(color, has_comment);
        marker::set_presentation_class(&mut self.doc, &self.rules.marker_attr, id, &class) > 0
    }

    /// The highlight id carried by `node` or its nearest marked ancestor.
    /// Used to detect clicks on existing highlights.
    pub fn highlight_id_at(&self, node: NodeId) -> Option<i64> {
        std::iter::once(node)
            .chain(self.doc.ancestors(node))
            .find_map(|n| self.doc.attribute(n, &self.rules.marker_attr)?.parse().ok())
    }
}
