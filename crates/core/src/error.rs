//! Fatal errors surfaced by the synthesis entry points.
//!
//! Anything that merely makes a schema fragment incomplete is reported as a
//! [`Diagnostic`](crate::Diagnostic) instead and never reaches this type.

/// Errors that abort a whole synthesis call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The single-schema input is unusable as a whole.
    #[error("invalid schema input: {0}")]
    InvalidSchema(String),

    /// The OpenAPI document is missing required top-level structure.
    #[error("invalid OpenAPI document: {0}")]
    InvalidDocument(String),

    /// No unique declaration name could be derived within the suffix bound.
    #[error("could not allocate a unique type name for `{base}` after {attempts} attempts")]
    NameExhausted {
        /// The fully ascended name that kept colliding.
        base: String,
        /// Number of suffixed candidates tried.
        attempts: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
