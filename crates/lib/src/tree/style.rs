//! Presentation style hints for rendering.
//!
//! Styles are advisory metadata consumed by the external text engine; they
//! never affect equality or the semantics of loaded values. Instead of a
//! branch mutating already-built children when a nested style is set, each
//! branch carries a [`StyleContext`] that is copied into children at
//! construction time, and effective-style resolution walks up to the
//! nearest ancestor context for fields that have no explicit style of their
//! own.

/// Layout hint for how a branch renders in text form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FlowStyle {
    /// Leave the choice to the text engine.
    #[default]
    Auto,
    /// One entry per line, indentation-nested.
    Block,
    /// Inline `{..}` / `[..]` layout.
    Flow,
}

/// Quoting/layout hint for how a scalar renders in text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// Style defaults a branch hands down to its children.
///
/// `None` entries leave the child's style untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StyleContext {
    pub flow: Option<FlowStyle>,
    pub scalar: Option<ScalarStyle>,
}

impl StyleContext {
    pub fn is_empty(&self) -> bool {
        self.flow.is_none() && self.scalar.is_none()
    }
}

/// Per-field style state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldStyle {
    /// The field's own flow style; `Auto` defers to ancestors.
    pub flow: FlowStyle,
    /// The field's own scalar style, if any.
    pub scalar: Option<ScalarStyle>,
    /// Defaults handed down to children of this branch.
    pub nested: StyleContext,
}
