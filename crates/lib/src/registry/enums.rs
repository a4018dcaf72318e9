//! Scalar conversion for unit enums.
//!
//! Enums convert through their variant names without an explicit
//! registration: implement [`EnumScalar`] (usually via the
//! [`enum_scalar!`](crate::enum_scalar) macro) and the document's
//! `get_enum`/`set_enum` accessors work directly. Registering through
//! [`Registry::add_enum`](super::Registry::add_enum) additionally routes
//! the plain typed accessors to the same conversion.
//!
//! ```
//! use doctree::enum_scalar;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Level {
//!     Low,
//!     High,
//! }
//!
//! enum_scalar!(Level { Low => "low", High => "high" });
//!
//! use doctree::registry::EnumScalar;
//! assert_eq!(Level::from_variant("HIGH"), Some(Level::High));
//! assert_eq!(Level::Low.variant(), "low");
//! ```

use std::marker::PhantomData;

use super::{LoadContext, Loader, MapError, Mapper};
use crate::outcome::Outcome;
use crate::tree::Scalar;

/// A type convertible to and from a closed set of variant names.
///
/// Name matching is case-insensitive on load; writes always use the
/// declared spelling.
pub trait EnumScalar: Sized + 'static {
    /// Every variant name, in declaration order.
    const VARIANTS: &'static [&'static str];

    /// Resolves a name to a variant, case-insensitively.
    fn from_variant(name: &str) -> Option<Self>;

    /// The declared name of this variant.
    fn variant(&self) -> &'static str;
}

/// Implements [`EnumScalar`](crate::registry::EnumScalar) for a unit enum.
#[macro_export]
macro_rules! enum_scalar {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $crate::registry::EnumScalar for $ty {
            const VARIANTS: &'static [&'static str] = &[$($name),+];

            fn from_variant(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case($name) {
                        return Some($ty::$variant);
                    }
                )+
                None
            }

            fn variant(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }
    };
}

/// Loads an [`EnumScalar`] from its variant name.
pub struct EnumLoader<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> EnumLoader<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for EnumLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: EnumScalar> Loader<T> for EnumLoader<T> {
    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<T> {
        let name = match scalar {
            Scalar::Str(s) => s.clone(),
            Scalar::Char(c) => c.to_string(),
            other => {
                return Outcome::invalid(
                    ctx.invalid(expected_variants::<T>(), other.type_name()),
                );
            }
        };
        match T::from_variant(&name) {
            Some(value) => Outcome::valid(value),
            None => Outcome::invalid(ctx.invalid(expected_variants::<T>(), format!("'{name}'"))),
        }
    }
}

/// Writes an [`EnumScalar`] as its declared variant name.
pub struct EnumMapper<T> {
    _marker: PhantomData<fn(T)>,
}

impl<T> EnumMapper<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for EnumMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: EnumScalar> Mapper<T> for EnumMapper<T> {
    fn map_scalar(&self, value: &T) -> Result<Scalar, MapError> {
        Ok(Scalar::Str(value.variant().to_string()))
    }
}

fn expected_variants<T: EnumScalar>() -> String {
    format!("one of [{}]", T::VARIANTS.join(", "))
}
