//!
//! Doctree: a typed, mutable in-memory model for YAML-shaped documents.
//!
//! The model is syntax-agnostic: an external [`raw::TextEngine`] owns the
//! text form, and this library owns everything between parse and render —
//! the tree of fields, path-based addressing, typed conversion, and the
//! presentation styles that let an edited document render back the way it
//! was written.
//!
//! ## Core Concepts
//!
//! * **Fields (`tree`)**: Every value is a field of one of three shapes: a
//!   scalar leaf, a keyed section, or an indexed sequence. Fields live in
//!   an arena and are addressed by generational handles, so a replaced
//!   field reads as dead instead of dangling.
//! * **Paths (`path`)**: Fields are addressed by dotted paths with
//!   case-insensitive keys, `name|alias` groups, and `[index]` sequence
//!   access. Writing through a path creates every missing step.
//! * **Conversions (`registry`)**: A bidirectional registry pairs each
//!   Rust type with a `Loader` (field to value) and a `Mapper` (value to
//!   field). Unit enums convert through their variant names with no
//!   registration at all.
//! * **Outcomes (`outcome`)**: Reads return a three-state [`Outcome`] that
//!   keeps "absent" and "present but malformed" apart, so defaults apply
//!   only to fields that are genuinely missing.
//! * **Documents (`document`)**: [`Document`] ties the pieces together and
//!   is the surface most callers use.
//!
//! ```
//! use doctree::Document;
//!
//! let mut doc = Document::new();
//! doc.set("database.pool|connections", 10i64)?;
//!
//! assert_eq!(doc.get::<i64>("DATABASE.POOL").ok(), Some(10));
//! assert_eq!(doc.get::<i64>("database.timeout").with_default(30)?, 30);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod document;
pub mod outcome;
pub mod path;
pub mod raw;
pub mod registry;
pub mod tree;

pub use document::Document;
pub use outcome::{FieldError, FieldErrorKind, Outcome};
pub use registry::{LoadContext, Loader, MapError, Mapper, Registry};
pub use tree::{FieldKind, FlowStyle, Scalar, ScalarStyle};

/// Result type used throughout the doctree library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the doctree library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Structured path-parse errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured node-model errors from the tree module
    #[error(transparent)]
    Tree(tree::TreeError),

    /// Structured registration errors from the registry module
    #[error(transparent)]
    Registry(registry::RegistryError),

    /// Field-level failures raised out of an [`Outcome`]
    #[error(transparent)]
    Field(FieldError),

    /// Structured engine errors from the raw boundary
    #[error(transparent)]
    Engine(raw::EngineError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Tree(_) => "tree",
            Error::Registry(_) => "registry",
            Error::Field(_) => "outcome",
            Error::Engine(_) => "raw",
        }
    }

    /// Check if this error came from parsing a malformed path.
    pub fn is_malformed_path(&self) -> bool {
        matches!(self, Error::Path(_))
    }

    /// Check if this error is a field-level conversion failure.
    pub fn is_field_error(&self) -> bool {
        matches!(self, Error::Field(_))
    }

    /// Check if this error indicates a stale field handle.
    pub fn is_detached(&self) -> bool {
        match self {
            Error::Tree(err) => err.is_detached(),
            _ => false,
        }
    }
}

impl From<FieldError> for Error {
    fn from(err: FieldError) -> Self {
        Error::Field(err)
    }
}
