//! Three-state result type for field access.
//!
//! [`Outcome`] distinguishes a value that resolved and converted
//! ([`Outcome::Valid`]) from a field that exists but failed conversion
//! ([`Outcome::Invalid`]) and from a path that does not exist at all
//! ([`Outcome::Absent`]). The distinction carries through every combinator,
//! which is what makes [`Outcome::with_default`] safe: a missing key may be
//! defaulted silently, a present-but-malformed key is always an error.
//!
//! # Usage
//!
//! ```
//! use doctree::Document;
//!
//! let mut doc = Document::new();
//! doc.set("retries", 3i64).unwrap();
//!
//! let retries: i64 = doc.get::<i64>("retries").with_default(1).unwrap();
//! assert_eq!(retries, 3);
//!
//! // Absent key: the default applies without error.
//! assert_eq!(doc.get::<i64>("missing").with_default(7).unwrap(), 7);
//! ```

mod error;

pub use error::{FieldError, FieldErrorKind};

/// Result of a typed field access.
///
/// The three states are never conflated:
///
/// - [`Outcome::Valid`] — resolved and converted successfully.
/// - [`Outcome::Invalid`] — the field exists but conversion failed.
/// - [`Outcome::Absent`] — the path did not resolve to a field.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The field resolved and converted successfully.
    Valid(T),
    /// The field exists but failed conversion (`exists_in_document() == true`).
    Invalid(FieldError),
    /// The path did not exist at all (`exists_in_document() == false`).
    Absent(FieldError),
}

impl<T> Outcome<T> {
    /// Wraps a successfully converted value.
    pub fn valid(value: T) -> Self {
        Outcome::Valid(value)
    }

    /// Marks a present-but-malformed field.
    pub fn invalid(error: FieldError) -> Self {
        Outcome::Invalid(error)
    }

    /// Marks a path that did not resolve.
    pub fn absent(error: FieldError) -> Self {
        Outcome::Absent(error)
    }

    /// True only for [`Outcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }

    /// True when the field was present in the document, even if malformed.
    pub fn exists(&self) -> bool {
        !matches!(self, Outcome::Absent(_))
    }

    /// Returns the value if valid.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Valid(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the stored error for the non-valid states.
    pub fn error(&self) -> Option<&FieldError> {
        match self {
            Outcome::Valid(_) => None,
            Outcome::Invalid(e) | Outcome::Absent(e) => Some(e),
        }
    }

    /// Discards the error detail, keeping only a valid value.
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Valid(v) => Some(v),
            _ => None,
        }
    }

    /// Transforms the valid value, preserving the state otherwise.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Valid(v) => Outcome::Valid(f(v)),
            Outcome::Invalid(e) => Outcome::Invalid(e),
            Outcome::Absent(e) => Outcome::Absent(e),
        }
    }

    /// Chains a dependent computation on the valid value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Outcome::Valid(v) => f(v),
            Outcome::Invalid(e) => Outcome::Invalid(e),
            Outcome::Absent(e) => Outcome::Absent(e),
        }
    }

    /// Replaces *any* non-valid state with `Valid(default)`.
    pub fn or(self, default: T) -> Outcome<T> {
        match self {
            Outcome::Valid(v) => Outcome::Valid(v),
            _ => Outcome::Valid(default),
        }
    }

    /// Demotes `Valid` to `Invalid` when the predicate rejects the value.
    ///
    /// The resulting error keeps `exists_in_document() == true`: the field
    /// was there, it just failed validation.
    pub fn require(self, predicate: impl FnOnce(&T) -> bool, message: impl Into<String>) -> Self {
        match self {
            Outcome::Valid(v) if !predicate(&v) => Outcome::Invalid(FieldError::new(
                FieldErrorKind::TypeMismatch,
                "",
                message.into(),
            )),
            other => other,
        }
    }

    /// Silently substitutes on any non-valid state, discarding the
    /// absent/invalid distinction.
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Outcome::Valid(v) => v,
            _ => default,
        }
    }

    /// Like [`Outcome::unwrap_or`] with a lazily computed substitute.
    pub fn unwrap_or_else(self, f: impl FnOnce() -> T) -> T {
        match self {
            Outcome::Valid(v) => v,
            _ => f(),
        }
    }

    /// Raises the stored error for any non-valid state.
    pub fn into_result(self) -> Result<T, FieldError> {
        match self {
            Outcome::Valid(v) => Ok(v),
            Outcome::Invalid(e) | Outcome::Absent(e) => Err(e),
        }
    }

    /// Substitutes the default only when the field is absent; a present but
    /// malformed field is still an error.
    ///
    /// This asymmetry is the core optional-vs-malformed contract: a missing
    /// key is fine to default, a wrong-typed key never is.
    pub fn with_default(self, default: T) -> Result<T, FieldError> {
        match self {
            Outcome::Valid(v) => Ok(v),
            Outcome::Absent(_) => Ok(default),
            Outcome::Invalid(e) => Err(e),
        }
    }

    /// Like [`Outcome::with_default`] with a lazily computed default.
    pub fn with_default_else(self, f: impl FnOnce() -> T) -> Result<T, FieldError> {
        match self {
            Outcome::Valid(v) => Ok(v),
            Outcome::Absent(_) => Ok(f()),
            Outcome::Invalid(e) => Err(e),
        }
    }

    /// Runs one of two callbacks depending on whether a valid value is
    /// present.
    pub fn if_present_or_else(self, present: impl FnOnce(T), otherwise: impl FnOnce(FieldError)) {
        match self {
            Outcome::Valid(v) => present(v),
            Outcome::Invalid(e) | Outcome::Absent(e) => otherwise(e),
        }
    }

    /// Error-collector variant for batched validation: pushes the error into
    /// `errors` and returns `None` for any non-valid state, so one pass can
    /// surface every field error in a document before failing.
    pub fn collect_or(self, errors: &mut Vec<FieldError>) -> Option<T> {
        match self {
            Outcome::Valid(v) => Some(v),
            Outcome::Invalid(e) | Outcome::Absent(e) => {
                errors.push(e);
                None
            }
        }
    }
}

impl<T> From<T> for Outcome<T> {
    fn from(value: T) -> Self {
        Outcome::Valid(value)
    }
}
