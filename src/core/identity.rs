//! Line identity: type-prefixed ULID keys and key resolution
//!
//! A key only addresses a line inside its ordered list. It plays no part in
//! costing. Keys read from foreign files (e.g. UUIDs written by other tools)
//! are kept verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Line type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinePrefix {
    /// Material / component line
    Mat,
    /// Operation / routing line
    Op,
}

impl LinePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinePrefix::Mat => "MAT",
            LinePrefix::Op => "OP",
        }
    }

    /// Human-readable line kind for messages
    pub fn noun(&self) -> &'static str {
        match self {
            LinePrefix::Mat => "material",
            LinePrefix::Op => "operation",
        }
    }
}

impl fmt::Display for LinePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LinePrefix {
    type Err = LineKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MAT" => Ok(LinePrefix::Mat),
            "OP" => Ok(LinePrefix::Op),
            _ => Err(LineKeyError::InvalidPrefix(s.to_string())),
        }
    }
}

/// Key of a material or operation line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey(String);

impl LineKey {
    /// Generate a fresh key with the given prefix, e.g. `MAT-01J...`
    pub fn new(prefix: LinePrefix) -> Self {
        Self(format!("{}-{}", prefix, Ulid::new()))
    }

    /// Wrap an existing key string as-is
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key carried by an imported record, or a fresh one when it has none
    pub fn from_value_or_new(value: Option<&serde_json::Value>, prefix: LinePrefix) -> Self {
        match value {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Self(s.clone()),
            Some(serde_json::Value::Number(n)) => Self(n.to_string()),
            _ => Self::new(prefix),
        }
    }

    /// Prefix of a generated key, if this key was generated by us
    pub fn prefix(&self) -> Option<LinePrefix> {
        let (prefix, ulid) = self.0.split_once('-')?;
        Ulid::from_string(ulid).ok()?;
        prefix.parse().ok()
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for LineKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LineKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Ok(Self(s)),
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "line id must be a non-empty string, got {}",
                other
            ))),
        }
    }
}

/// Anything stored in an ordered, key-addressed line list
pub trait Keyed {
    fn key(&self) -> &LineKey;
}

/// Resolve a user-supplied reference to a position in `lines`.
///
/// Accepted forms, tried in order:
/// - `#N` or `N`: 1-based position
/// - the full key
/// - a unique, case-insensitive key prefix
pub fn resolve_line<T: Keyed>(
    lines: &[T],
    reference: &str,
    prefix: LinePrefix,
) -> Result<usize, LineKeyError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(LineKeyError::Empty);
    }

    let positional = reference.strip_prefix('#').unwrap_or(reference);
    if let Ok(n) = positional.parse::<usize>() {
        if n >= 1 && n <= lines.len() {
            return Ok(n - 1);
        }
        return Err(LineKeyError::OutOfRange {
            kind: prefix.noun(),
            position: n,
            len: lines.len(),
        });
    }

    if let Some(pos) = lines.iter().position(|l| l.key().as_str() == reference) {
        return Ok(pos);
    }

    let needle = reference.to_uppercase();
    let matches: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.key().as_str().to_uppercase().starts_with(&needle))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [single] => Ok(*single),
        [] => Err(LineKeyError::NotFound {
            kind: prefix.noun(),
            reference: reference.to_string(),
        }),
        many => Err(LineKeyError::Ambiguous {
            reference: reference.to_string(),
            count: many.len(),
        }),
    }
}

/// Errors raised when addressing lines
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineKeyError {
    #[error("invalid line prefix: '{0}' (valid: MAT, OP)")]
    InvalidPrefix(String),

    #[error("empty line reference")]
    Empty,

    #[error("no {kind} line at position {position} (list has {len} line(s))")]
    OutOfRange {
        kind: &'static str,
        position: usize,
        len: usize,
    },

    #[error("no {kind} line matching '{reference}'")]
    NotFound {
        kind: &'static str,
        reference: String,
    },

    #[error("'{reference}' matches {count} lines; use a longer prefix or a position")]
    Ambiguous { reference: String, count: usize },
}
