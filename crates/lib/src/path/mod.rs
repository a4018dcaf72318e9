//! Field path parsing.
//!
//! A path addresses a field in a document: dot-separated segments, where
//! each segment names a section key (with optional `|`-separated aliases)
//! followed by zero or more `[index]` accesses into sequences.
//!
//! ```text
//! path    := segment ('.' segment)*
//! segment := alias ('|' alias)* ('[' digits ']')*
//! ```
//!
//! Key matching is case-insensitive, and within an alias group the first
//! alias that exists in the document wins. Parsing flattens each segment
//! into a run of [`FieldKey`]s, so `servers|hosts[0].port` becomes
//! `[Multi(servers, hosts), Index(0), Simple(port)]`.
//!
//! ```
//! use doctree::path::{FieldKey, Route};
//!
//! let route: Route = "servers|hosts[0].port".parse().unwrap();
//! assert_eq!(route.keys().len(), 3);
//! assert_eq!(route.to_string(), "servers[0].port");
//! assert!(route.keys()[0].matches("HOSTS"));
//! ```

pub mod errors;

pub use errors::PathError;

use std::fmt;
use std::str::FromStr;

/// One resolution step along a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    /// A single section key.
    Simple(String),
    /// An alias group; the first name that exists in the section wins.
    Multi(Vec<String>),
    /// A sequence index.
    Index(usize),
}

impl FieldKey {
    /// True when this key addresses the given stored section key,
    /// case-insensitively. Index keys never match names.
    pub fn matches(&self, stored: &str) -> bool {
        match self {
            FieldKey::Simple(name) => name.eq_ignore_ascii_case(stored),
            FieldKey::Multi(names) => names.iter().any(|n| n.eq_ignore_ascii_case(stored)),
            FieldKey::Index(_) => false,
        }
    }

    /// The aliases this key can resolve through, in declaration order.
    pub fn aliases(&self) -> &[String] {
        match self {
            FieldKey::Simple(name) => std::slice::from_ref(name),
            FieldKey::Multi(names) => names,
            FieldKey::Index(_) => &[],
        }
    }

    /// The name used when the key has to be created: the first alias.
    pub fn canonical(&self) -> Option<&str> {
        self.aliases().first().map(String::as_str)
    }

    pub fn is_index(&self) -> bool {
        matches!(self, FieldKey::Index(_))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Simple(name) => write!(f, "{name}"),
            FieldKey::Multi(names) => write!(f, "{}", names.join("|")),
            FieldKey::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    keys: Vec<FieldKey>,
    raw: String,
}

impl Route {
    /// Parses a path string into resolution steps.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }
        let mut keys = Vec::new();
        let mut position = 0;
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                    position,
                });
            }
            parse_segment(path, segment, &mut keys)?;
            position += segment.len() + 1;
        }
        Ok(Self {
            keys,
            raw: path.to_string(),
        })
    }

    /// The resolution steps in order.
    pub fn keys(&self) -> &[FieldKey] {
        &self.keys
    }

    /// The path string as written, aliases included.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromStr for Route {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

/// Renders the alias-stripped display form: the first alias of each group,
/// dots between named keys, indices as `[i]`.
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for key in &self.keys {
            match key {
                FieldKey::Index(i) => write!(f, "[{i}]")?,
                named => {
                    if !first {
                        write!(f, ".")?;
                    }
                    match named.canonical() {
                        Some(name) => write!(f, "{name}")?,
                        None => {}
                    }
                }
            }
            first = false;
        }
        Ok(())
    }
}

/// Flattens one `alias('|'alias)*('['digits']')*` segment into keys.
fn parse_segment(path: &str, segment: &str, keys: &mut Vec<FieldKey>) -> Result<(), PathError> {
    let name_end = segment.find('[').unwrap_or(segment.len());
    let (names, indices) = segment.split_at(name_end);
    if names.is_empty() {
        return Err(PathError::MissingAlias {
            path: path.to_string(),
        });
    }

    let aliases: Vec<String> = names.split('|').map(str::to_string).collect();
    if aliases.iter().any(String::is_empty) {
        return Err(PathError::EmptyAlias {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }
    keys.push(if aliases.len() == 1 {
        FieldKey::Simple(aliases.into_iter().next().unwrap_or_default())
    } else {
        FieldKey::Multi(aliases)
    });

    let mut rest = indices;
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            let character = rest.chars().next().unwrap_or('?');
            return Err(PathError::UnexpectedCharacter {
                path: path.to_string(),
                character,
            });
        };
        let Some(close) = inner.find(']') else {
            return Err(PathError::UnterminatedIndex {
                path: path.to_string(),
            });
        };
        let digits = &inner[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PathError::InvalidIndex {
                path: path.to_string(),
                index: digits.to_string(),
            });
        }
        let index = digits.parse().map_err(|_| PathError::InvalidIndex {
            path: path.to_string(),
            index: digits.to_string(),
        })?;
        keys.push(FieldKey::Index(index));
        rest = &inner[close + 1..];
    }
    Ok(())
}
