//! Error types for tree surgery.

use thiserror::Error;

use super::FieldKind;

/// Structured error types for node-model operations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The field id refers to a node that has been replaced or freed.
    #[error("field handle is no longer attached to the tree")]
    Detached,

    /// An operation needed one field shape but found another.
    #[error("kind mismatch: expected {expected}, found {actual}")]
    KindMismatch {
        expected: FieldKind,
        actual: FieldKind,
    },
}

impl TreeError {
    pub fn is_detached(&self) -> bool {
        matches!(self, TreeError::Detached)
    }

    pub fn is_kind_mismatch(&self) -> bool {
        matches!(self, TreeError::KindMismatch { .. })
    }
}

impl From<TreeError> for crate::Error {
    fn from(err: TreeError) -> Self {
        crate::Error::Tree(err)
    }
}
