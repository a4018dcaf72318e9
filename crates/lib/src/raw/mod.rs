//! The raw boundary: plain data in, plain data out.
//!
//! Text syntax is not this crate's business. An external [`TextEngine`]
//! parses text into a [`RawDocument`] (untyped values, a header comment
//! block, and per-path style hints) and renders one back out; the document
//! converts between that and its typed tree. [`Raw`] is deliberately
//! serde-friendly so engines can be built on any serde format.
//!
//! Characters narrow at this boundary: a `char` field exports as a
//! one-length string, and loads back as `char` through the builtin
//! conversion.

use indexmap::IndexMap;
use thiserror::Error;

use crate::document::{Document, resolver};
use crate::path::Route;
use crate::registry::Registry;
use crate::tree::{FieldId, FieldKind, FieldStyle, FieldValue, Scalar, SectionMut, SequenceMut, Tree};

/// An untyped document value, as an engine sees it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Raw {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Raw>),
    Map(IndexMap<String, Raw>),
}

impl Raw {
    /// An empty map, the shape of an empty document.
    pub fn map() -> Self {
        Raw::Map(IndexMap::new())
    }
}

/// Everything an engine exchanges with a document: the value tree, the
/// leading comment block, and style hints keyed by display path (the root
/// is the empty path).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub header: Vec<String>,
    pub body: Raw,
    #[serde(default)]
    pub styles: IndexMap<String, FieldStyle>,
}

impl RawDocument {
    pub fn new(body: Raw) -> Self {
        Self {
            header: Vec::new(),
            body,
            styles: IndexMap::new(),
        }
    }
}

/// A pluggable text syntax.
pub trait TextEngine {
    fn parse(&self, text: &str) -> Result<RawDocument, EngineError>;
    fn render(&self, doc: &RawDocument) -> Result<String, EngineError>;
}

/// Failure inside a text engine.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("parse failed: {0}")]
    Parse(String),

    #[error("render failed: {0}")]
    Render(String),
}

impl From<EngineError> for crate::Error {
    fn from(err: EngineError) -> Self {
        crate::Error::Engine(err)
    }
}

impl Document {
    /// Exports the document for an engine to render.
    pub fn to_raw(&self) -> RawDocument {
        let tree = self.tree();
        let mut styles = IndexMap::new();
        collect_styles(tree, tree.root(), &mut styles);
        RawDocument {
            header: self.header().to_vec(),
            body: field_to_raw(tree, tree.root()),
            styles,
        }
    }

    /// Builds a document from engine output, with the default conversions.
    pub fn from_raw(raw: RawDocument) -> Document {
        Self::from_raw_with(raw, Registry::new())
    }

    /// Builds a document from engine output using the given registry.
    pub fn from_raw_with(raw: RawDocument, registry: Registry) -> Document {
        let mut doc = Document::with_registry(registry);
        doc.set_header(raw.header);
        doc.replace_tree(raw_to_tree(&raw.body));
        apply_styles(doc.tree_mut(), &raw.styles);
        doc
    }

    /// Parses text through an engine into a document.
    pub fn parse_with<E: TextEngine>(engine: &E, text: &str) -> crate::Result<Document> {
        Ok(Self::from_raw(engine.parse(text)?))
    }

    /// Renders the document to text through an engine.
    pub fn render_with<E: TextEngine>(&self, engine: &E) -> crate::Result<String> {
        Ok(engine.render(&self.to_raw())?)
    }
}

fn field_to_raw(tree: &Tree, id: FieldId) -> Raw {
    match tree.kind(id) {
        Some(FieldKind::Section) => Raw::Map(
            tree.section_iter(id)
                .map(|(key, child)| (key.to_string(), field_to_raw(tree, child)))
                .collect(),
        ),
        Some(FieldKind::Sequence) => Raw::List(
            tree.sequence_iter(id)
                .map(|child| field_to_raw(tree, child))
                .collect(),
        ),
        _ => match tree.scalar(id) {
            Some(Scalar::Bool(b)) => Raw::Bool(*b),
            Some(Scalar::Int(n)) => Raw::Int(*n),
            Some(Scalar::Float(x)) => Raw::Float(*x),
            Some(Scalar::Str(s)) => Raw::Str(s.clone()),
            // Chars narrow to one-length strings here.
            Some(Scalar::Char(c)) => Raw::Str(c.to_string()),
            None => Raw::Str(String::new()),
        },
    }
}

fn raw_to_tree(raw: &Raw) -> Tree {
    match raw {
        Raw::Map(map) => {
            let mut tree = Tree::new();
            let root = tree.root();
            fill_section(&mut SectionMut::new(&mut tree, root), map);
            tree
        }
        Raw::List(items) => {
            let mut tree = Tree::with_root(FieldValue::sequence());
            let root = tree.root();
            fill_sequence(&mut SequenceMut::new(&mut tree, root), items);
            tree
        }
        scalar => Tree::with_root(FieldValue::Scalar(raw_scalar(scalar))),
    }
}

fn fill_section(section: &mut SectionMut<'_>, map: &IndexMap<String, Raw>) {
    for (key, value) in map {
        match value {
            Raw::Map(nested) => fill_section(&mut section.section(key), nested),
            Raw::List(items) => fill_sequence(&mut section.sequence(key), items),
            scalar => section.set(key, raw_scalar(scalar)),
        }
    }
}

fn fill_sequence(sequence: &mut SequenceMut<'_>, items: &[Raw]) {
    for item in items {
        match item {
            Raw::Map(nested) => fill_section(&mut sequence.push_section(), nested),
            Raw::List(inner) => fill_sequence(&mut sequence.push_sequence(), inner),
            scalar => {
                sequence.push(raw_scalar(scalar));
            }
        }
    }
}

/// Only called for the scalar variants.
fn raw_scalar(raw: &Raw) -> Scalar {
    match raw {
        Raw::Bool(b) => Scalar::Bool(*b),
        Raw::Int(n) => Scalar::Int(*n),
        Raw::Float(x) => Scalar::Float(*x),
        Raw::Str(s) => Scalar::Str(s.clone()),
        Raw::List(_) | Raw::Map(_) => Scalar::Str(String::new()),
    }
}

fn collect_styles(tree: &Tree, id: FieldId, styles: &mut IndexMap<String, FieldStyle>) {
    if let Some(style) = tree.style(id)
        && style != FieldStyle::default()
    {
        styles.insert(tree.display_path(id), style);
    }
    for child in tree.children(id) {
        collect_styles(tree, child, styles);
    }
}

fn apply_styles(tree: &mut Tree, styles: &IndexMap<String, FieldStyle>) {
    for (path, style) in styles {
        let id = if path.is_empty() {
            Some(tree.root())
        } else {
            Route::parse(path)
                .ok()
                .and_then(|route| resolver::resolve(tree, &route))
        };
        if let Some(id) = id {
            tree.set_style(id, *style);
        }
    }
}
