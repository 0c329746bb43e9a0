//! Crate error types
//!
//! Only loading a document is fallible. Anchoring and marker operations
//! report their outcome as booleans, options, or counts so the caller can
//! decide whether a miss is worth surfacing to the user.

use thiserror::Error;

/// Errors raised while loading markup into a [`crate::dom::Document`].
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed markup
    #[error("markup parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// Malformed attribute inside a tag
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
}

/// Result type alias for document loading
pub type Result<T> = std::result::Result<T, Error>;
