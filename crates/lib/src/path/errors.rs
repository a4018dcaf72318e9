//! Error types for path parsing.

use thiserror::Error;

/// Structured error types for malformed field paths.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("path is empty")]
    Empty,

    /// Two dots in a row, or a leading/trailing dot.
    #[error("empty segment at position {position} in '{path}'")]
    EmptySegment { path: String, position: usize },

    /// An alias group like `a||b` or `|a` contains an empty alternative.
    #[error("empty alias in segment '{segment}' of '{path}'")]
    EmptyAlias { path: String, segment: String },

    /// Index brackets hold something other than decimal digits.
    #[error("invalid index '[{index}]' in '{path}'")]
    InvalidIndex { path: String, index: String },

    /// A segment starts with `[` instead of an alias.
    #[error("segment in '{path}' starts with an index; an alias is required")]
    MissingAlias { path: String },

    /// Text follows a closing `]` inside a segment, e.g. `a[0]b`.
    #[error("unexpected character '{character}' after index in '{path}'")]
    UnexpectedCharacter { path: String, character: char },

    /// An opening `[` with no matching `]`.
    #[error("unterminated index in '{path}'")]
    UnterminatedIndex { path: String },
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}
