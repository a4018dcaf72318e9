//! Error value carried by non-valid [`Outcome`](super::Outcome) states.
//!
//! A [`FieldError`] describes why a field access failed without raising:
//! which document it came from, the logical path that was asked for, the
//! problem description supplied by the active loader, and the specific
//! cause. Callers turn it into a hard error only through
//! [`Outcome::into_result`](super::Outcome::into_result) or
//! [`Outcome::with_default`](super::Outcome::with_default).

use std::{fmt, path::PathBuf};

/// Classification of a field-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The path did not resolve to any field (`exists_in_document() == false`).
    Missing,
    /// The field exists but could not be converted to the requested type.
    TypeMismatch,
    /// A loader or mapper was invoked with a field shape it does not implement.
    UnsupportedShape,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldErrorKind::Missing => write!(f, "missing field"),
            FieldErrorKind::TypeMismatch => write!(f, "type mismatch"),
            FieldErrorKind::UnsupportedShape => write!(f, "unsupported shape"),
        }
    }
}

/// A recoverable field access failure.
///
/// Carried inside [`Outcome::Invalid`](super::Outcome::Invalid) and
/// [`Outcome::Absent`](super::Outcome::Absent). The display form always
/// includes the logical path (aliases stripped) and the cause; the source
/// file and the loader's problem description are included when known.
#[derive(Debug, Clone)]
pub struct FieldError {
    kind: FieldErrorKind,
    file: Option<PathBuf>,
    path: String,
    problem: Option<String>,
    cause: String,
    trace: Option<String>,
}

impl FieldError {
    /// Creates an error of the given kind at the given display path.
    pub fn new(kind: FieldErrorKind, path: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            kind,
            file: None,
            path: path.into(),
            problem: None,
            cause: cause.into(),
            trace: None,
        }
    }

    /// Shorthand for a [`FieldErrorKind::Missing`] error.
    pub fn missing(path: impl Into<String>) -> Self {
        let path = path.into();
        let cause = format!("no field at '{path}'");
        Self::new(FieldErrorKind::Missing, path, cause)
    }

    /// Shorthand for a [`FieldErrorKind::TypeMismatch`] error.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::new(
            FieldErrorKind::TypeMismatch,
            path,
            format!("expected {expected}, found {actual}"),
        )
    }

    /// Shorthand for a [`FieldErrorKind::UnsupportedShape`] error.
    pub fn unsupported_shape(path: impl Into<String>, shape: impl fmt::Display) -> Self {
        Self::new(
            FieldErrorKind::UnsupportedShape,
            path,
            format!("shape {shape} is not supported here"),
        )
    }

    /// Attaches the originating file path.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches the loader-supplied problem description.
    pub fn with_problem(mut self, problem: impl Into<String>) -> Self {
        self.problem = Some(problem.into());
        self
    }

    /// Attaches a captured stack trace (diagnostics only, recorded when the
    /// document debug flag is set).
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }

    pub fn kind(&self) -> FieldErrorKind {
        self.kind
    }

    /// Logical dotted path with aliases stripped for display.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file(&self) -> Option<&std::path::Path> {
        self.file.as_deref()
    }

    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }

    pub fn trace(&self) -> Option<&str> {
        self.trace.as_deref()
    }

    /// True when the path existed but held the wrong thing.
    pub fn exists_in_document(&self) -> bool {
        !matches!(self.kind, FieldErrorKind::Missing)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(file) = &self.file {
            write!(f, " in {}", file.display())?;
        }
        if !self.path.is_empty() {
            write!(f, " at '{}'", self.path)?;
        }
        if let Some(problem) = &self.problem {
            write!(f, " ({problem})")?;
        }
        write!(f, ": {}", self.cause)
    }
}

impl std::error::Error for FieldError {}
