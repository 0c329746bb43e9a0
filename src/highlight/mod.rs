//! Highlight anchoring and rendering
//!
//! Projects persisted highlights onto a live document and reverses those
//! projections:
//!
//! - `types`: the highlight data model and wire format shared with the
//!   extension's supervisory layer
//! - `index`: filtered text index and fuzzy span matching
//! - `marker`: text-node splitting, marker wrapping, and removal
//! - `session`: the per-page entry point driving the other three

pub mod index;
pub mod marker;
pub mod session;
pub mod types;

pub use index::{is_indexable, TextIndex};
pub use session::HighlightSession;
pub use types::{presentation_class, Color, ExclusionRules, Highlight, Span};
