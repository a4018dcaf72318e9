//! Bidirectional type-conversion registry.
//!
//! A [`Registry`] maps Rust types to the pair of conversions a document
//! needs: a [`Loader`] that turns fields into typed values on read, and a
//! [`Mapper`] that turns typed values back into fields on write. Lookups
//! key on [`TypeId`]; a type with no direct registration may still resolve
//! through declared coverage ([`Registry::cover_loader`],
//! [`Registry::cover_mapper`]), and resolution is deterministic: direct
//! registration wins, exactly one covering registration is used, more than
//! one is refused as ambiguous rather than silently picking.
//!
//! Missing or ambiguous registrations are programmer errors. The plain
//! accessors panic; `try_` variants return [`RegistryError`] for callers
//! probing registration state.
//!
//! ```
//! use doctree::registry::{LoadContext, Loader, Registry};
//! use doctree::tree::Scalar;
//! use doctree::Outcome;
//!
//! struct PortLoader;
//!
//! impl Loader<u16> for PortLoader {
//!     fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<u16> {
//!         match scalar.as_int().and_then(|n| u16::try_from(n).ok()) {
//!             Some(port) => Outcome::valid(port),
//!             None => Outcome::invalid(ctx.invalid("port", scalar.type_name())),
//!         }
//!     }
//! }
//!
//! let mut registry = Registry::empty();
//! registry.add_loader(PortLoader);
//! assert!(registry.has_loader::<u16>());
//! ```

pub mod convert;
pub mod enums;
pub mod errors;

pub use enums::EnumScalar;
pub use errors::{MapError, RegistryError};

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::outcome::{FieldError, Outcome};
use crate::tree::{FieldKind, FieldRef, Scalar, SectionMut, SequenceMut};

/// Per-access context handed to loaders.
///
/// Carries the display path of the field being loaded, the source file (if
/// the document has one), and the problem stack composite loaders push
/// descriptions onto so nested failures read top-down. Error builders on
/// the context stamp all of that onto the produced [`FieldError`].
pub struct LoadContext<'a> {
    registry: &'a Registry,
    path: String,
    file: Option<&'a Path>,
    debug: bool,
    problems: &'a RefCell<Vec<String>>,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        path: String,
        file: Option<&'a Path>,
        debug: bool,
        problems: &'a RefCell<Vec<String>>,
    ) -> Self {
        Self {
            registry,
            path,
            file,
            debug,
            problems,
        }
    }

    /// Display path of the field being loaded, aliases stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// A context re-anchored at another field, for nested loads.
    pub fn at(&self, field: &FieldRef<'_>) -> LoadContext<'a> {
        LoadContext {
            registry: self.registry,
            path: field.display_path(),
            file: self.file,
            debug: self.debug,
            problems: self.problems,
        }
    }

    /// Loads a nested field through the registry, re-anchoring the context.
    pub fn load<T: 'static>(&self, field: FieldRef<'_>) -> Outcome<T> {
        let ctx = self.at(&field);
        self.registry.load(field, &ctx)
    }

    /// Pushes a problem description for the duration of the returned guard.
    ///
    /// Errors built while the guard lives carry the most recent description,
    /// so a composite loader can label which part of its input it was
    /// reading when a nested load failed.
    pub fn push_problem(&self, problem: impl Into<String>) -> ProblemGuard<'a> {
        self.problems.borrow_mut().push(problem.into());
        ProblemGuard {
            problems: self.problems,
        }
    }

    /// A missing-field error at this context's path.
    pub fn missing(&self) -> FieldError {
        self.finish(FieldError::missing(&self.path))
    }

    /// A type-mismatch error at this context's path.
    pub fn invalid(&self, expected: impl fmt::Display, actual: impl fmt::Display) -> FieldError {
        self.finish(FieldError::type_mismatch(&self.path, expected, actual))
    }

    /// An unsupported-shape error at this context's path.
    pub fn unsupported(&self, shape: FieldKind) -> FieldError {
        self.finish(FieldError::unsupported_shape(&self.path, shape))
    }

    /// A type-mismatch error with a caller-supplied cause.
    pub fn failure(&self, cause: impl Into<String>) -> FieldError {
        self.finish(FieldError::new(
            crate::outcome::FieldErrorKind::TypeMismatch,
            &self.path,
            cause,
        ))
    }

    fn finish(&self, mut err: FieldError) -> FieldError {
        if let Some(file) = self.file {
            err = err.with_file(file);
        }
        if let Some(problem) = self.problems.borrow().last() {
            err = err.with_problem(problem.clone());
        }
        if self.debug {
            err = err.with_trace(std::backtrace::Backtrace::force_capture().to_string());
        }
        err
    }
}

/// Pops the pushed problem description when dropped.
pub struct ProblemGuard<'a> {
    problems: &'a RefCell<Vec<String>>,
}

impl Drop for ProblemGuard<'_> {
    fn drop(&mut self) {
        self.problems.borrow_mut().pop();
    }
}

/// Reads a typed value out of a field.
///
/// Implement the shape methods the type supports; the rest default to an
/// unsupported-shape [`Outcome::Invalid`]. Composite loaders recurse
/// through [`LoadContext::load`].
pub trait Loader<T> {
    /// Description of what this loader reads, pushed onto the problem stack
    /// around every load so nested errors say what was being read.
    fn problem(&self) -> Option<String> {
        None
    }

    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<T> {
        let _ = scalar;
        Outcome::Invalid(ctx.unsupported(FieldKind::Scalar))
    }

    fn load_section(&self, section: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<T> {
        let _ = section;
        Outcome::Invalid(ctx.unsupported(FieldKind::Section))
    }

    fn load_sequence(&self, sequence: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<T> {
        let _ = sequence;
        Outcome::Invalid(ctx.unsupported(FieldKind::Sequence))
    }

    /// Dispatches on the field's shape. Loaders rarely override this.
    fn load(&self, field: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<T> {
        match field.scalar() {
            Some(scalar) => self.load_scalar(scalar, ctx),
            None => match field.kind() {
                FieldKind::Sequence => self.load_sequence(field, ctx),
                _ => self.load_section(field, ctx),
            },
        }
    }
}

/// Writes a typed value into a field.
///
/// Implement the shape methods the type supports. Writers first try the
/// shape the target field already has; on [`MapError::UnsupportedShape`]
/// they rebuild the field as [`Mapper::default_shape`] and retry.
pub trait Mapper<T> {
    /// The shape this mapper produces when the target gives no guidance.
    fn default_shape(&self) -> FieldKind {
        FieldKind::Scalar
    }

    /// When true, existing children of a branch target are kept and the
    /// mapper merges into them; otherwise the branch is cleared first.
    fn keep_existing(&self) -> bool {
        false
    }

    fn map_scalar(&self, value: &T) -> Result<Scalar, MapError> {
        let _ = value;
        Err(MapError::unsupported(FieldKind::Scalar))
    }

    fn map_section(&self, value: &T, section: &mut SectionMut<'_>) -> Result<(), MapError> {
        let _ = (value, section);
        Err(MapError::unsupported(FieldKind::Section))
    }

    fn map_sequence(&self, value: &T, sequence: &mut SequenceMut<'_>) -> Result<(), MapError> {
        let _ = (value, sequence);
        Err(MapError::unsupported(FieldKind::Sequence))
    }
}

struct Slot {
    entry: Box<dyn Any>,
}

struct CoverSlot {
    /// Type name of the directly registered source, for diagnostics.
    source: &'static str,
    entry: Box<dyn Any>,
}

/// The bidirectional conversion table.
///
/// Tables are insertion-ordered so ambiguity diagnostics list candidates in
/// registration order.
#[derive(Default)]
pub struct Registry {
    loaders: IndexMap<TypeId, Slot>,
    mappers: IndexMap<TypeId, Slot>,
    loader_covers: IndexMap<TypeId, Vec<CoverSlot>>,
    mapper_covers: IndexMap<TypeId, Vec<CoverSlot>>,
}

impl Registry {
    /// A registry with conversions for the primitive scalar types
    /// registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        convert::register_defaults(&mut registry);
        registry
    }

    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers the loader for `T`, replacing any previous one.
    pub fn add_loader<T: 'static>(&mut self, loader: impl Loader<T> + 'static) {
        let entry: Arc<dyn Loader<T>> = Arc::new(loader);
        self.loaders.insert(
            TypeId::of::<T>(),
            Slot {
                entry: Box::new(entry),
            },
        );
    }

    /// Registers the mapper for `T`, replacing any previous one.
    pub fn add_mapper<T: 'static>(&mut self, mapper: impl Mapper<T> + 'static) {
        let entry: Arc<dyn Mapper<T>> = Arc::new(mapper);
        self.mappers.insert(
            TypeId::of::<T>(),
            Slot {
                entry: Box::new(entry),
            },
        );
    }

    /// Registers both directions for an [`EnumScalar`] type.
    pub fn add_enum<T: EnumScalar>(&mut self) {
        self.add_loader(enums::EnumLoader::<T>::new());
        self.add_mapper(enums::EnumMapper::<T>::new());
    }

    /// Shorthand for the common text-to-value case: installs a loader that
    /// parses the field's canonical text form with `parse`.
    pub fn add_deserializer<T, F>(&mut self, parse: F)
    where
        T: 'static,
        F: Fn(&str) -> Result<T, String> + 'static,
    {
        self.add_loader(convert::FnDeserializer { parse });
    }

    /// Shorthand for the common value-to-text case: installs a mapper that
    /// writes the value as a string scalar.
    pub fn add_serializer<T, F>(&mut self, render: F)
    where
        T: 'static,
        F: Fn(&T) -> String + 'static,
    {
        self.add_mapper(convert::FnSerializer { render });
    }

    /// Declares that `T`'s loader also covers requests for `U`.
    ///
    /// The loader for `T` must already be registered. Loads of `U` run it
    /// and convert through `From`.
    ///
    /// # Panics
    ///
    /// Panics with [`RegistryError::NoLoader`] when `T` has no loader.
    pub fn cover_loader<T, U>(&mut self)
    where
        T: 'static,
        U: From<T> + 'static,
    {
        let inner = self.loader_for::<T>();
        let adapter: Arc<dyn Loader<U>> = Arc::new(CoveredLoader::<T, U> {
            inner,
            _marker: PhantomData,
        });
        self.loader_covers
            .entry(TypeId::of::<U>())
            .or_default()
            .push(CoverSlot {
                source: type_name::<T>(),
                entry: Box::new(adapter),
            });
    }

    /// Declares that `T`'s mapper also covers writes of `U`.
    ///
    /// The mapper for `T` must already be registered. Writes of `U` convert
    /// through `Into` and run it.
    ///
    /// # Panics
    ///
    /// Panics with [`RegistryError::NoMapper`] when `T` has no mapper.
    pub fn cover_mapper<T, U>(&mut self)
    where
        T: 'static,
        U: Into<T> + Clone + 'static,
    {
        let inner = self.mapper_for::<T>();
        let adapter: Arc<dyn Mapper<U>> = Arc::new(CoveredMapper::<T, U> {
            inner,
            _marker: PhantomData,
        });
        self.mapper_covers
            .entry(TypeId::of::<U>())
            .or_default()
            .push(CoverSlot {
                source: type_name::<T>(),
                entry: Box::new(adapter),
            });
    }

    pub fn has_loader<T: 'static>(&self) -> bool {
        self.try_loader_for::<T>().is_ok()
    }

    pub fn has_mapper<T: 'static>(&self) -> bool {
        self.try_mapper_for::<T>().is_ok()
    }

    /// Resolves the loader for `T`: direct registration first, then exactly
    /// one covering registration.
    pub fn try_loader_for<T: 'static>(&self) -> Result<Arc<dyn Loader<T>>, RegistryError> {
        if let Some(slot) = self.loaders.get(&TypeId::of::<T>()) {
            return Ok(downcast::<dyn Loader<T>>(slot.entry.as_ref()));
        }
        match self.loader_covers.get(&TypeId::of::<T>()) {
            Some(covers) if covers.len() == 1 => Ok(downcast::<dyn Loader<T>>(covers[0].entry.as_ref())),
            Some(covers) if covers.len() > 1 => Err(RegistryError::AmbiguousLoader {
                type_name: type_name::<T>(),
                candidates: covers.iter().map(|c| c.source).collect(),
            }),
            _ => Err(RegistryError::NoLoader {
                type_name: type_name::<T>(),
            }),
        }
    }

    /// Resolves the mapper for `T`, with the same precedence as
    /// [`Registry::try_loader_for`].
    pub fn try_mapper_for<T: 'static>(&self) -> Result<Arc<dyn Mapper<T>>, RegistryError> {
        if let Some(slot) = self.mappers.get(&TypeId::of::<T>()) {
            return Ok(downcast::<dyn Mapper<T>>(slot.entry.as_ref()));
        }
        match self.mapper_covers.get(&TypeId::of::<T>()) {
            Some(covers) if covers.len() == 1 => Ok(downcast::<dyn Mapper<T>>(covers[0].entry.as_ref())),
            Some(covers) if covers.len() > 1 => Err(RegistryError::AmbiguousMapper {
                type_name: type_name::<T>(),
                candidates: covers.iter().map(|c| c.source).collect(),
            }),
            _ => Err(RegistryError::NoMapper {
                type_name: type_name::<T>(),
            }),
        }
    }

    /// # Panics
    ///
    /// Panics when `T` has no loader or its coverage is ambiguous; both are
    /// registration bugs, not document problems.
    pub fn loader_for<T: 'static>(&self) -> Arc<dyn Loader<T>> {
        self.try_loader_for::<T>()
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// # Panics
    ///
    /// Panics when `T` has no mapper or its coverage is ambiguous.
    pub fn mapper_for<T: 'static>(&self) -> Arc<dyn Mapper<T>> {
        self.try_mapper_for::<T>()
            .unwrap_or_else(|err| panic!("{err}"))
    }

    /// Loads a field as `T`, pushing the loader's problem description for
    /// the duration of the load.
    pub fn load<T: 'static>(&self, field: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<T> {
        trace!(path = ctx.path(), ty = type_name::<T>(), "load field");
        let loader = self.loader_for::<T>();
        let _guard = loader.problem().map(|p| ctx.push_problem(p));
        loader.load(field, ctx)
    }
}

/// The slot is keyed by `TypeId`, so the boxed entry is always the matching
/// `Arc`.
fn downcast<D: ?Sized + 'static>(entry: &dyn Any) -> Arc<D> {
    entry
        .downcast_ref::<Arc<D>>()
        .expect("registry slot holds the entry registered for its type id")
        .clone()
}

struct CoveredLoader<T, U> {
    inner: Arc<dyn Loader<T>>,
    _marker: PhantomData<fn(T) -> U>,
}

impl<T, U> Loader<U> for CoveredLoader<T, U>
where
    T: 'static,
    U: From<T>,
{
    fn problem(&self) -> Option<String> {
        self.inner.problem()
    }

    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<U> {
        self.inner.load_scalar(scalar, ctx).map(U::from)
    }

    fn load_section(&self, section: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<U> {
        self.inner.load_section(section, ctx).map(U::from)
    }

    fn load_sequence(&self, sequence: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<U> {
        self.inner.load_sequence(sequence, ctx).map(U::from)
    }

    fn load(&self, field: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<U> {
        self.inner.load(field, ctx).map(U::from)
    }
}

struct CoveredMapper<T, U> {
    inner: Arc<dyn Mapper<T>>,
    _marker: PhantomData<fn(U) -> T>,
}

impl<T, U> Mapper<U> for CoveredMapper<T, U>
where
    T: 'static,
    U: Into<T> + Clone,
{
    fn default_shape(&self) -> FieldKind {
        self.inner.default_shape()
    }

    fn keep_existing(&self) -> bool {
        self.inner.keep_existing()
    }

    fn map_scalar(&self, value: &U) -> Result<Scalar, MapError> {
        self.inner.map_scalar(&value.clone().into())
    }

    fn map_section(&self, value: &U, section: &mut SectionMut<'_>) -> Result<(), MapError> {
        self.inner.map_section(&value.clone().into(), section)
    }

    fn map_sequence(&self, value: &U, sequence: &mut SequenceMut<'_>) -> Result<(), MapError> {
        self.inner.map_sequence(&value.clone().into(), sequence)
    }
}
