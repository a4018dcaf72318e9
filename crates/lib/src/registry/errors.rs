//! Error types for the conversion registry.

use thiserror::Error;

use crate::tree::FieldKind;

/// Registration-level failures.
///
/// These indicate programmer errors (a type used before its conversion was
/// registered, or coverage declared twice), so the infallible registry
/// accessors panic with them instead of threading them through field
/// outcomes. The `try_` accessors surface them as values.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No loader is registered (directly or through coverage) for the type.
    #[error("no loader registered for {type_name}")]
    NoLoader { type_name: &'static str },

    /// No mapper is registered (directly or through coverage) for the type.
    #[error("no mapper registered for {type_name}")]
    NoMapper { type_name: &'static str },

    /// More than one declared coverage could serve the requested type.
    #[error("ambiguous loader coverage for {type_name}: covered by {candidates:?}")]
    AmbiguousLoader {
        type_name: &'static str,
        candidates: Vec<&'static str>,
    },

    /// More than one declared coverage could serve the requested type.
    #[error("ambiguous mapper coverage for {type_name}: covered by {candidates:?}")]
    AmbiguousMapper {
        type_name: &'static str,
        candidates: Vec<&'static str>,
    },
}

impl From<RegistryError> for crate::Error {
    fn from(err: RegistryError) -> Self {
        crate::Error::Registry(err)
    }
}

/// Failure produced by a mapper while writing a value into the tree.
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The mapper does not produce this field shape. Writers fall back to
    /// the mapper's default shape when the existing field reports this.
    #[error("mapper does not produce a {shape}")]
    UnsupportedShape { shape: FieldKind },

    /// The value itself could not be mapped.
    #[error("{0}")]
    Failed(String),
}

impl MapError {
    pub fn unsupported(shape: FieldKind) -> Self {
        MapError::UnsupportedShape { shape }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        MapError::Failed(message.into())
    }

    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, MapError::UnsupportedShape { .. })
    }
}
