//! Marginalia highlight engine
//!
//! The highlight anchoring and rendering core of a self-hosted
//! bookmarking client: given highlights persisted as `(text, offsets)`
//! pairs, project them onto a live document as inert marker elements, and
//! reverse those projections cleanly.
//!
//! # Modules
//!
//! - `dom`: headless arena document tree with the mutation surface the
//!   engine needs (split, wrap, unwrap, normalize)
//! - `highlight`: the engine itself: filtered text index, fuzzy span
//!   matching, marker materialization, and the per-page session object
//! - `error`: loading errors (anchoring itself never fails fatally)
//!
//! # Example
//!
//! ```
//! use marginalia::dom::Document;
//! use marginalia::{Color, Highlight, HighlightSession, Span};
//!
//! let doc = Document::parse("<p>The quick brown fox</p>").unwrap();
//! let mut session = HighlightSession::new(doc);
//!
//! let highlight = Highlight::new(1, 10, "quick brown", Span::new(4, 15), Color::Yellow);
//! assert!(session.project_highlight(&highlight));
//! assert_eq!(session.unproject_highlight(1), 1);
//! ```

pub mod dom;
pub mod error;
pub mod highlight;

pub use error::{Error, Result};
pub use highlight::{
    is_indexable, presentation_class, Color, ExclusionRules, Highlight, HighlightSession, Span,
    TextIndex,
};
