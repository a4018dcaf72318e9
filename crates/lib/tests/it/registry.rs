//! Conversion registry behavior through the document surface.

use doctree::enum_scalar;
use doctree::registry::{LoadContext, MapError, Registry};
use doctree::tree::{FieldKind, FieldRef, Scalar, SectionMut};
use doctree::{Document, Loader, Mapper, Outcome};

#[derive(Debug, Clone, PartialEq)]
struct Retry {
    attempts: i64,
    backoff_ms: i64,
}

struct RetryLoader;

impl Loader<Retry> for RetryLoader {
    fn problem(&self) -> Option<String> {
        Some("while reading retry settings".into())
    }

    /// A bare int is shorthand for "this many attempts".
    fn load_scalar(&self, scalar: &Scalar, ctx: &LoadContext<'_>) -> Outcome<Retry> {
        match scalar.as_int() {
            Some(attempts) => Outcome::valid(Retry {
                attempts,
                backoff_ms: 100,
            }),
            None => Outcome::invalid(ctx.invalid("int", scalar.type_name())),
        }
    }

    fn load_section(&self, section: FieldRef<'_>, ctx: &LoadContext<'_>) -> Outcome<Retry> {
        // The section exists, so a missing required subfield is invalid,
        // not absent; it must never be silently defaulted away.
        let attempts = match section.get("attempts") {
            Some(field) => ctx.load::<i64>(field),
            None => Outcome::invalid(ctx.invalid("a section with 'attempts'", "one without it")),
        };
        attempts.and_then(|attempts| {
            let backoff = match section.get("backoff_ms") {
                Some(field) => ctx.load::<i64>(field),
                None => Outcome::valid(100),
            };
            backoff.map(|backoff_ms| Retry {
                attempts,
                backoff_ms,
            })
        })
    }
}

struct RetryMapper;

impl Mapper<Retry> for RetryMapper {
    fn default_shape(&self) -> FieldKind {
        FieldKind::Section
    }

    fn map_section(&self, value: &Retry, section: &mut SectionMut<'_>) -> Result<(), MapError> {
        section.set("attempts", value.attempts);
        section.set("backoff_ms", value.backoff_ms);
        Ok(())
    }
}

fn retry_doc() -> Document {
    let mut doc = Document::new();
    doc.registry_mut().add_loader(RetryLoader);
    doc.registry_mut().add_mapper(RetryMapper);
    doc
}

#[test]
fn custom_type_round_trips_as_a_section() {
    let mut doc = retry_doc();
    let retry = Retry {
        attempts: 5,
        backoff_ms: 250,
    };
    doc.set("http.retry", retry.clone()).unwrap();

    assert_eq!(doc.field("http.retry").unwrap().kind(), FieldKind::Section);
    assert_eq!(doc.get::<i64>("http.retry.attempts").ok(), Some(5));
    assert_eq!(doc.get::<Retry>("http.retry").ok(), Some(retry));
}

#[test]
fn loader_handles_multiple_shapes() {
    let mut doc = retry_doc();
    doc.set("r", 3i64).unwrap();

    // The scalar shorthand loads with the default backoff.
    assert_eq!(
        doc.get::<Retry>("r").ok(),
        Some(Retry {
            attempts: 3,
            backoff_ms: 100,
        })
    );
}

#[test]
fn nested_load_errors_carry_the_loader_problem() {
    let mut doc = retry_doc();
    doc.set("retry.attempts", "lots").unwrap();

    let err = doc.get::<Retry>("retry").into_result().unwrap_err();
    assert_eq!(err.problem(), Some("while reading retry settings"));
    // The path points at the nested field that actually failed.
    assert_eq!(err.path(), "retry.attempts");
}

#[test]
fn missing_required_subfield_reports_its_path() {
    let mut doc = retry_doc();
    doc.set("retry.backoff_ms", 10i64).unwrap();

    let out = doc.get::<Retry>("retry");
    assert!(!out.is_valid());
    // The section itself was present, so the outcome stays "invalid" and
    // with_default refuses to paper over it.
    assert!(out.exists());
    let err = out.into_result().unwrap_err();
    assert_eq!(err.path(), "retry");
}

#[derive(Debug, Clone, PartialEq)]
struct Attempts(i64);

impl From<Retry> for Attempts {
    fn from(r: Retry) -> Self {
        Attempts(r.attempts)
    }
}

impl From<Attempts> for Retry {
    fn from(a: Attempts) -> Self {
        Retry {
            attempts: a.0,
            backoff_ms: 100,
        }
    }
}

#[test]
fn coverage_routes_an_unregistered_type_through_a_registered_one() {
    let mut doc = retry_doc();
    doc.registry_mut().cover_loader::<Retry, Attempts>();
    doc.registry_mut().cover_mapper::<Retry, Attempts>();

    doc.set("r", Attempts(7)).unwrap();
    // The covered mapper wrote the full Retry section.
    assert_eq!(doc.get::<i64>("r.attempts").ok(), Some(7));
    assert_eq!(doc.get::<Attempts>("r").ok(), Some(Attempts(7)));
}

#[test]
#[should_panic(expected = "no loader registered")]
fn unregistered_type_panics_on_read() {
    let mut doc = Document::new();
    doc.set("x", 0i64).unwrap();
    let _ = doc.get::<Retry>("x");
}

#[test]
#[should_panic(expected = "ambiguous loader coverage")]
fn double_coverage_panics_on_read() {
    let mut registry = Registry::new();
    // Two coverage declarations both claim Attempts.
    registry.add_loader(RetryLoader);
    registry.cover_loader::<Retry, Attempts>();
    registry.cover_loader::<Retry, Attempts>();

    let mut doc = Document::with_registry(registry);
    doc.set("n", 1i64).unwrap();
    let _ = doc.get::<Attempts>("n");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Zstd,
}

enum_scalar!(Compression {
    None => "none",
    Gzip => "gzip",
    Zstd => "zstd",
});

#[test]
fn registered_enum_routes_plain_accessors() {
    let mut doc = Document::new();
    doc.registry_mut().add_enum::<Compression>();

    doc.set("transfer.compression", Compression::Zstd).unwrap();
    assert_eq!(
        doc.get::<String>("transfer.compression").ok(),
        Some("zstd".into())
    );
    assert_eq!(
        doc.get::<Compression>("transfer.compression").ok(),
        Some(Compression::Zstd)
    );

    doc.set("transfer.compression", "GZIP").unwrap();
    assert_eq!(
        doc.get::<Compression>("transfer.compression").ok(),
        Some(Compression::Gzip)
    );
}

#[derive(Debug, Clone, PartialEq)]
struct Version {
    major: u32,
    minor: u32,
}

fn parse_version(text: &str) -> Result<Version, String> {
    let (major, minor) = text
        .split_once('.')
        .ok_or_else(|| format!("'{text}' is not a version"))?;
    Ok(Version {
        major: major.parse().map_err(|_| format!("bad major in '{text}'"))?,
        minor: minor.parse().map_err(|_| format!("bad minor in '{text}'"))?,
    })
}

#[test]
fn string_shorthand_installs_a_loader_and_mapper() {
    let mut doc = Document::new();
    doc.registry_mut().add_deserializer(parse_version);
    doc.registry_mut()
        .add_serializer(|v: &Version| format!("{}.{}", v.major, v.minor));

    doc.set("api.version", Version { major: 1, minor: 4 }).unwrap();
    // Serialized as a plain string scalar.
    assert_eq!(doc.get::<String>("api.version").ok(), Some("1.4".into()));
    assert_eq!(
        doc.get::<Version>("api.version").ok(),
        Some(Version { major: 1, minor: 4 })
    );

    // Parse failures carry the function's own message.
    doc.set("api.version", "not-a-version").unwrap();
    let err = doc.get::<Version>("api.version").into_result().unwrap_err();
    assert!(err.exists_in_document());
    assert!(err.cause().contains("not a version"));
}

#[test]
fn unknown_enum_variant_is_invalid_and_lists_choices() {
    let mut doc = Document::new();
    doc.set("compression", "brotli").unwrap();

    let out = doc.get_enum::<Compression>("compression");
    assert!(out.exists());
    assert!(!out.is_valid());
    let cause = out.error().unwrap().cause().to_string();
    assert!(cause.contains("gzip"));
    assert!(cause.contains("zstd"));
}
