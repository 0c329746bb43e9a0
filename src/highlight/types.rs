//! Highlight data model and wire format
//!
//! These types cross the message-passing boundary to the extension's
//! supervisory layer, so the serde names are the wire contract: camelCase
//! field names, lowercase color values, decimal string ids in markup.

use serde::{Deserialize, Serialize};

/// Attribute carrying a marker's highlight identity (decimal id string).
pub const MARKER_ATTR: &str = "data-marginalia-id";

/// Element name used for highlight markers.
pub const MARKER_TAG: &str = "span";

/// Class prefix for highlight presentation classes.
pub const HIGHLIGHT_CLASS: &str = "marginalia-highlight";

/// Class carried by the selection toolbox UI; its subtree is never indexed.
pub const TOOLBOX_CLASS: &str = "marginalia-toolbox";

/// A persisted highlight, owned by the supervisory layer and passed in as
/// an immutable value per call.
///
/// `text` is the exact highlighted substring at creation time. It may
/// drift if the page content changes between visits; the matcher
/// tolerates drift by re-locating the text before trusting the stored
/// offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    /// Stable id, unique per link
    pub id: i64,
    /// The bookmark (link) this highlight belongs to
    pub link_id: i64,
    /// Highlight color
    pub color: Color,
    /// Optional user comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Exact highlighted substring at creation time
    pub text: String,
    /// Logical start offset at creation time
    pub start_offset: usize,
    /// Logical end offset at creation time (half-open)
    pub end_offset: usize,
}

impl Highlight {
    /// Create a highlight with no comment.
    pub fn new(id: i64, link_id: i64, text: &str, span: Span, color: Color) -> Self {
        Self {
            id,
            link_id,
            color,
            comment: None,
            text: text.to_string(),
            start_offset: span.start,
            end_offset: span.end,
        }
    }

    /// Attach a comment.
    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    /// Whether this highlight carries a non-empty comment.
    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// The presentation class for this highlight's current state.
    pub fn presentation_class(&self) -> String {
        presentation_class(self.color, self.has_comment())
    }
}

/// Highlight colors offered by the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Yellow,
    Red,
    Blue,
    Green,
}

impl Color {
    /// Lowercase color name, as used in class names and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::Yellow
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A half-open `[start, end)` pair of logical character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Compute the presentation class for a color and comment-presence.
///
/// Deterministic and recomputable from a [`Highlight`] value at any time;
/// there is no hidden state in the markup.
pub fn presentation_class(color: Color, has_comment: bool) -> String {
    let mut class = format!("{} {}-{}", HIGHLIGHT_CLASS, HIGHLIGHT_CLASS, color.as_str());
    if has_comment {
        class.push(' ');
        class.push_str(HIGHLIGHT_CLASS);
        class.push_str("-note");
    }
    class
}

/// What the text index skips: tag names whose subtrees are invisible
/// (script/style), the toolbox UI class, and the marker identity
/// attribute so highlighted text is never re-indexed (and markers can
/// never nest).
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    /// Lowercase tag names whose subtrees are excluded
    pub excluded_tags: Vec<String>,
    /// UI class whose subtree is excluded
    pub ui_class: String,
    /// Identity attribute marking existing highlights
    pub marker_attr: String,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            excluded_tags: vec![
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
            ],
            ui_class: TOOLBOX_CLASS.to_string(),
            marker_attr: MARKER_ATTR.to_string(),
        }
    }
}
