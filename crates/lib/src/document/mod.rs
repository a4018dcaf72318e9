//! The document: a typed, path-addressed view over a tree.
//!
//! A [`Document`] owns a [`Tree`] and a [`Registry`] and exposes the whole
//! model through string paths: [`Document::get`] resolves a path and loads
//! the field as a Rust type, [`Document::set`] resolves for writing
//! (creating every missing step along the way) and maps a Rust value into
//! the field. Reads report through [`Outcome`], which keeps "absent" and
//! "present but malformed" apart all the way to the caller.
//!
//! ```
//! use doctree::Document;
//!
//! let mut doc = Document::new();
//! doc.set("server.port", 8080i64)?;
//! doc.set("server.hosts[1]", "fallback")?;
//!
//! assert_eq!(doc.get::<i64>("server.port").ok(), Some(8080));
//! // Aliases resolve to whichever name exists.
//! assert_eq!(doc.get::<i64>("listen|server.port").ok(), Some(8080));
//! // Absent fields default silently; malformed ones never do.
//! assert_eq!(doc.get::<i64>("server.workers").with_default(4)?, 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub(crate) mod resolver;

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::outcome::{FieldError, FieldErrorKind, Outcome};
use crate::path::Route;
use crate::registry::enums::{EnumLoader, EnumMapper};
use crate::registry::{EnumScalar, LoadContext, Loader, MapError, Mapper, Registry};
use crate::tree::{FieldId, FieldKind, FieldMut, FieldRef, FieldValue, SectionMut, SequenceMut, Tree};

use resolver::WriteSlot;

/// A mutable, typed document.
pub struct Document {
    tree: Tree,
    registry: Registry,
    /// Leading comment lines preserved across parse and render.
    header: Vec<String>,
    /// When set, field errors carry a captured backtrace.
    debug: bool,
    source: Option<PathBuf>,
    problems: RefCell<Vec<String>>,
}

impl Document {
    /// An empty document with the default conversions registered.
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// An empty document using the given registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            tree: Tree::new(),
            registry,
            header: Vec::new(),
            debug: false,
            source: None,
            problems: RefCell::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Replaces the conversion registry wholesale.
    pub fn set_registry(&mut self, registry: Registry) {
        self.registry = registry;
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub(crate) fn replace_tree(&mut self, tree: Tree) {
        self.tree = tree;
    }

    /// Enables backtrace capture on field errors.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Records the file this document came from; field errors mention it.
    pub fn set_source(&mut self, source: impl Into<PathBuf>) {
        self.source = Some(source.into());
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn set_header(&mut self, lines: Vec<String>) {
        self.header = lines;
    }

    /// Read cursor at the document root.
    pub fn root(&self) -> FieldRef<'_> {
        FieldRef::new(&self.tree, self.tree.root())
    }

    /// Write cursor at the document root.
    pub fn root_mut(&mut self) -> FieldMut<'_> {
        let root = self.tree.root();
        FieldMut::new(&mut self.tree, root)
    }

    /// Wipes every field; registry, header, and source stay.
    pub fn clear(&mut self) {
        let root = self.tree.root();
        self.tree.clear(root);
    }

    /// Read cursor at a path, `None` when the path is malformed or does not
    /// resolve.
    pub fn field(&self, path: &str) -> Option<FieldRef<'_>> {
        let route = Route::parse(path).ok()?;
        let id = resolver::resolve(&self.tree, &route)?;
        Some(FieldRef::new(&self.tree, id))
    }

    /// Write cursor at a path, for style edits and shape conversion.
    pub fn field_mut(&mut self, path: &str) -> Option<FieldMut<'_>> {
        let route = Route::parse(path).ok()?;
        let id = resolver::resolve(&self.tree, &route)?;
        Some(FieldMut::new(&mut self.tree, id))
    }

    /// True when the path parses and resolves to an existing field.
    pub fn contains(&self, path: &str) -> bool {
        self.field(path).is_some()
    }

    /// Resolves a path and loads the field as `T`.
    ///
    /// An unresolvable path yields [`Outcome::Absent`]; a field that exists
    /// but will not convert yields [`Outcome::Invalid`]. A malformed path
    /// reads as absent, with the parse failure as the cause.
    ///
    /// # Panics
    ///
    /// Panics when `T` has no registered loader; registration is a
    /// programmer responsibility, not a document condition.
    pub fn get<T: 'static>(&self, path: &str) -> Outcome<T> {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(err) => return Outcome::absent(self.malformed(path, &err)),
        };
        match resolver::resolve(&self.tree, &route) {
            Some(id) => {
                let field = FieldRef::new(&self.tree, id);
                let ctx = self.context(field.display_path());
                self.registry.load(field, &ctx)
            }
            None => Outcome::absent(self.context(route.to_string()).missing()),
        }
    }

    /// Like [`Document::get`] for [`EnumScalar`] types; works without any
    /// registration.
    pub fn get_enum<T: EnumScalar>(&self, path: &str) -> Outcome<T> {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(err) => return Outcome::absent(self.malformed(path, &err)),
        };
        match resolver::resolve(&self.tree, &route) {
            Some(id) => {
                let field = FieldRef::new(&self.tree, id);
                let ctx = self.context(field.display_path());
                EnumLoader::<T>::new().load(field, &ctx)
            }
            None => Outcome::absent(self.context(route.to_string()).missing()),
        }
    }

    /// Resolves a path for writing and maps `value` into the field.
    ///
    /// Every missing step along the path is created, shaped by the next
    /// key; existing steps of the wrong shape are converted. The value is
    /// first mapped at the shape the target field already has, falling back
    /// to the mapper's default shape when that shape is unsupported.
    ///
    /// # Panics
    ///
    /// Panics when `T` has no registered mapper.
    pub fn set<T: 'static>(&mut self, path: &str, value: T) -> crate::Result<()> {
        debug!(path, "set field");
        let route = Route::parse(path)?;
        let mapper = self.registry.mapper_for::<T>();
        let slot = resolver::resolve_for_write(&mut self.tree, &route)?;

        let default_shape = mapper.default_shape();
        let target_shape = slot
            .child(&self.tree)
            .and_then(|id| self.tree.kind(id))
            .unwrap_or(default_shape);

        match write_value(&mut self.tree, &slot, mapper.as_ref(), &value, target_shape) {
            Ok(()) => Ok(()),
            Err(err) if err.is_unsupported_shape() && target_shape != default_shape => {
                write_value(&mut self.tree, &slot, mapper.as_ref(), &value, default_shape)
                    .map_err(|err| self.write_failure(route.to_string(), err))
            }
            Err(err) => Err(self.write_failure(route.to_string(), err)),
        }
    }

    /// Like [`Document::set`] for [`EnumScalar`] types; works without any
    /// registration.
    pub fn set_enum<T: EnumScalar>(&mut self, path: &str, value: T) -> crate::Result<()> {
        debug!(path, variant = value.variant(), "set enum field");
        let route = Route::parse(path)?;
        let slot = resolver::resolve_for_write(&mut self.tree, &route)?;
        let scalar = EnumMapper::<T>::new()
            .map_scalar(&value)
            .map_err(|err| self.write_failure(route.to_string(), err))?;
        slot.put(&mut self.tree, FieldValue::Scalar(scalar));
        Ok(())
    }

    /// Removes whatever the path addresses. Returns whether anything was
    /// removed; a malformed path is an error, not a no-op.
    pub fn remove(&mut self, path: &str) -> crate::Result<bool> {
        debug!(path, "remove field");
        let route = Route::parse(path)?;
        Ok(resolver::remove(&mut self.tree, &route))
    }

    fn context(&self, path: String) -> LoadContext<'_> {
        LoadContext::new(
            &self.registry,
            path,
            self.source.as_deref(),
            self.debug,
            &self.problems,
        )
    }

    fn malformed(&self, path: &str, err: &crate::path::PathError) -> FieldError {
        let mut field_err = FieldError::new(FieldErrorKind::Missing, path, err.to_string());
        if let Some(source) = &self.source {
            field_err = field_err.with_file(source);
        }
        field_err
    }

    fn write_failure(&self, path: String, err: MapError) -> crate::Error {
        let mut field_err = FieldError::new(FieldErrorKind::TypeMismatch, path, err.to_string());
        if let Some(source) = &self.source {
            field_err = field_err.with_file(source);
        }
        crate::Error::Field(field_err)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("source", &self.source)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Maps the value into the slot at one specific shape.
///
/// Branch output is built in a staged node and committed only once the
/// mapper succeeds, so a failed write leaves the document as it was. The
/// one exception is a `keep_existing` merge into a branch that already has
/// the right shape, which mutates that branch in place.
fn write_value<T>(
    tree: &mut Tree,
    slot: &WriteSlot,
    mapper: &dyn Mapper<T>,
    value: &T,
    shape: FieldKind,
) -> Result<(), MapError> {
    if shape == FieldKind::Scalar {
        let scalar = mapper.map_scalar(value)?;
        slot.put(tree, FieldValue::Scalar(scalar));
        return Ok(());
    }
    if mapper.keep_existing()
        && let Some(id) = slot.child(tree).filter(|id| tree.kind(*id) == Some(shape))
    {
        return map_branch(tree, id, mapper, value, shape);
    }
    let staged = slot.stage(tree, FieldValue::empty(shape));
    match map_branch(tree, staged, mapper, value, shape) {
        Ok(()) => {
            slot.attach(tree, staged);
            Ok(())
        }
        Err(err) => {
            tree.discard(staged);
            Err(err)
        }
    }
}

fn map_branch<T>(
    tree: &mut Tree,
    id: FieldId,
    mapper: &dyn Mapper<T>,
    value: &T,
    shape: FieldKind,
) -> Result<(), MapError> {
    if shape == FieldKind::Section {
        mapper.map_section(value, &mut SectionMut::new(tree, id))
    } else {
        mapper.map_sequence(value, &mut SequenceMut::new(tree, id))
    }
}
