//! Builtin conversions for the primitive scalar types.
//!
//! Every primitive accepts its own scalar kind plus a parse from text, so
//! documents whose engine reads everything as strings still load typed
//! values. Numeric loads out of range report a type mismatch rather than
//! wrapping.

use super::{LoadContext, Loader, MapError, Mapper, Registry};
use crate::outcome::Outcome;
use crate::tree::Scalar;

pub(crate) fn register_defaults(registry: &mut Registry) {
    registry.add_loader::<bool>(BoolConversion);
    registry.add_mapper::<bool>(BoolConversion);
    registry.add_loader::<char>(CharConversion);
    registry.add_mapper::<char>(CharConversion);
    registry.add_loader::<String>(StringConversion);
    registry.add_mapper::<String>(StringConversion);
    registry.add_mapper::<&'static str>(StrMapper);
    registry.add_loader::<i8>(I8Conversion);
    registry.add_mapper::<i8>(I8Conversion);
    registry.add_loader::<i16>(I16Conversion);
    registry.add_mapper::<i16>(I16Conversion);
    registry.add_loader::<i32>(I32Conversion);
    registry.add_mapper::<i32>(I32Conversion);
    registry.add_loader::<i64>(I64Conversion);
    registry.add_mapper::<i64>(I64Conversion);
    registry.add_loader::<u8>(U8Conversion);
    registry.add_mapper::<u8>(U8Conversion);
    registry.add_loader::<u16>(U16Conversion);
    registry.add_mapper::<u16>(U16Conversion);
    registry.add_loader::<u32>(U32Conversion);
    registry.add_mapper::<u32>(U32Conversion);
    registry.add_loader::<u64>(U64Conversion);
    registry.add_mapper::<u64>(U64Conversion);
    registry.add_loader::<f32>(F32Conversion);
    registry.add_mapper::<f32>(F32Conversion);
    registry.add_loader::<f64>(F64Conversion);
    registry.add_mapper::<f64>(F64Conversion);
}

struct BoolConversion;

impl Loader<bool> for BoolConversion {
    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<bool> {
        match scalar {
            Scalar::Bool(b) => Outcome::valid(*b),
            Scalar::Str(s) if s.eq_ignore_ascii_case("true") => Outcome::valid(true),
            Scalar::Str(s) if s.eq_ignore_ascii_case("false") => Outcome::valid(false),
            other => Outcome::invalid(ctx.invalid("bool", other.type_name())),
        }
    }
}

impl Mapper<bool> for BoolConversion {
    fn map_scalar(&self, value: &bool) -> Result<Scalar, MapError> {
        Ok(Scalar::Bool(*value))
    }
}

struct CharConversion;

impl Loader<char> for CharConversion {
    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<char> {
        match scalar {
            Scalar::Char(c) => Outcome::valid(*c),
            Scalar::Str(s) if s.chars().count() == 1 => {
                Outcome::valid(s.chars().next().unwrap_or_default())
            }
            other => Outcome::invalid(ctx.invalid("char", other.type_name())),
        }
    }
}

impl Mapper<char> for CharConversion {
    fn map_scalar(&self, value: &char) -> Result<Scalar, MapError> {
        Ok(Scalar::Char(*value))
    }
}

struct StringConversion;

impl Loader<String> for StringConversion {
    /// Strings accept every scalar through its canonical text form.
    fn load_scalar(&self, scalar: &Scalar, _ctx: &LoadContext<'_>) -> Outcome<String> {
        Outcome::valid(scalar.render())
    }
}

impl Mapper<String> for StringConversion {
    fn map_scalar(&self, value: &String) -> Result<Scalar, MapError> {
        Ok(Scalar::Str(value.clone()))
    }
}

/// Function-backed loader installed by
/// [`Registry::add_deserializer`](super::Registry::add_deserializer).
pub(crate) struct FnDeserializer<F> {
    pub(crate) parse: F,
}

impl<T, F> Loader<T> for FnDeserializer<F>
where
    F: Fn(&str) -> Result<T, String>,
{
    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<T> {
        match (self.parse)(&scalar.render()) {
            Ok(value) => Outcome::valid(value),
            Err(cause) => Outcome::invalid(ctx.failure(cause)),
        }
    }
}

/// Function-backed mapper installed by
/// [`Registry::add_serializer`](super::Registry::add_serializer).
pub(crate) struct FnSerializer<F> {
    pub(crate) render: F,
}

impl<T, F> Mapper<T> for FnSerializer<F>
where
    F: Fn(&T) -> String,
{
    fn map_scalar(&self, value: &T) -> Result<Scalar, MapError> {
        Ok(Scalar::Str((self.render)(value)))
    }
}

/// Write-only: string literals map in, loads go through `String`.
struct StrMapper;

impl Mapper<&'static str> for StrMapper {
    fn map_scalar(&self, value: &&'static str) -> Result<Scalar, MapError> {
        Ok(Scalar::Str((*value).to_string()))
    }
}

macro_rules! int_conversion {
    ($name:ident, $ty:ty) => {
        struct $name;

        impl Loader<$ty> for $name {
            fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<$ty> {
                match scalar {
                    Scalar::Int(n) => match <$ty>::try_from(*n) {
                        Ok(v) => Outcome::valid(v),
                        Err(_) => Outcome::invalid(
                            ctx.invalid(stringify!($ty), format!("out-of-range int {n}")),
                        ),
                    },
                    Scalar::Str(s) => match s.trim().parse::<$ty>() {
                        Ok(v) => Outcome::valid(v),
                        Err(_) => Outcome::invalid(
                            ctx.invalid(stringify!($ty), format!("unparsable text '{s}'")),
                        ),
                    },
                    other => Outcome::invalid(ctx.invalid(stringify!($ty), other.type_name())),
                }
            }
        }

        impl Mapper<$ty> for $name {
            fn map_scalar(&self, value: &$ty) -> Result<Scalar, MapError> {
                Ok(Scalar::Int(i64::from(*value)))
            }
        }
    };
}

int_conversion!(I8Conversion, i8);
int_conversion!(I16Conversion, i16);
int_conversion!(I32Conversion, i32);
int_conversion!(I64Conversion, i64);
int_conversion!(U8Conversion, u8);
int_conversion!(U16Conversion, u16);
int_conversion!(U32Conversion, u32);

struct U64Conversion;

impl Loader<u64> for U64Conversion {
    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<u64> {
        match scalar {
            Scalar::Int(n) => match u64::try_from(*n) {
                Ok(v) => Outcome::valid(v),
                Err(_) => {
                    Outcome::invalid(ctx.invalid("u64", format!("out-of-range int {n}")))
                }
            },
            // Values above i64::MAX round-trip through text.
            Scalar::Str(s) => match s.trim().parse::<u64>() {
                Ok(v) => Outcome::valid(v),
                Err(_) => Outcome::invalid(ctx.invalid("u64", format!("unparsable text '{s}'"))),
            },
            other => Outcome::invalid(ctx.invalid("u64", other.type_name())),
        }
    }
}

impl Mapper<u64> for U64Conversion {
    fn map_scalar(&self, value: &u64) -> Result<Scalar, MapError> {
        match i64::try_from(*value) {
            Ok(n) => Ok(Scalar::Int(n)),
            Err(_) => Ok(Scalar::Str(value.to_string())),
        }
    }
}

macro_rules! float_conversion {
    ($name:ident, $ty:ty) => {
        struct $name;

        impl Loader<$ty> for $name {
            fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<$ty> {
                match scalar {
                    Scalar::Float(x) => Outcome::valid(*x as $ty),
                    Scalar::Int(n) => Outcome::valid(*n as $ty),
                    Scalar::Str(s) => match s.trim().parse::<$ty>() {
                        Ok(v) => Outcome::valid(v),
                        Err(_) => Outcome::invalid(
                            ctx.invalid(stringify!($ty), format!("unparsable text '{s}'")),
                        ),
                    },
                    other => Outcome::invalid(ctx.invalid(stringify!($ty), other.type_name())),
                }
            }
        }

        impl Mapper<$ty> for $name {
            fn map_scalar(&self, value: &$ty) -> Result<Scalar, MapError> {
                Ok(Scalar::Float(f64::from(*value)))
            }
        }
    };
}

float_conversion!(F32Conversion, f32);
float_conversion!(F64Conversion, f64);
