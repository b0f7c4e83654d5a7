//! JSON Pointer navigation within a single document.
//!
//! A pointer comes from the fragment of a `$ref` URI (`#/components/schemas/Pet`).
//! The fragment is percent-decoded, split on `/` and each segment unescaped
//! per RFC 6901 (`~1` is `/`, `~0` is `~`). Empty segments are dropped, so
//! `#`, `#/` and `#//a` address the root, the root, and `/a`.

use std::fmt;

use serde_json::Value;

use crate::error::RefError;
use crate::types::json_type_name;

/// A parsed JSON Pointer: a list of unescaped reference tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer {
    segments: Vec<String>,
}

impl Pointer {
    /// The empty pointer, addressing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a URI fragment, with or without its leading `#`.
    pub fn from_fragment(fragment: &str) -> Self {
        let raw = fragment.strip_prefix('#').unwrap_or(fragment);
        let decoded = match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        };
        let segments = decoded
            .split('/')
            .filter(|part| !part.is_empty())
            .map(unescape)
            .collect();
        Self { segments }
    }

    /// Build a pointer from already unescaped tokens.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

/// Unescape one reference token (`~1` before `~0`, so `~01` stays `~1`).
fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Escape one reference token for use in a pointer string.
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Append an escaped token to a pointer string.
pub(crate) fn child_path(path: &str, token: &str) -> String {
    format!("{}/{}", path, escape(token))
}

/// Descend one segment from `node`.
///
/// Arrays take a decimal index in `[0, len)`; objects take an existing key.
/// Scalars cannot be indexed.
pub fn step<'v>(node: &'v Value, segment: &str) -> Result<&'v Value, RefError> {
    match node {
        Value::Array(items) => {
            let index = parse_index(segment)?;
            usize::try_from(index)
                .ok()
                .and_then(|i| items.get(i))
                .ok_or(RefError::IndexOutOfRange {
                    index,
                    len: items.len(),
                })
        }
        Value::Object(map) => map.get(segment).ok_or_else(|| RefError::MissingProperty {
            key: segment.to_string(),
        }),
        scalar => Err(RefError::CannotIndexScalar {
            segment: segment.to_string(),
            actual: json_type_name(scalar).to_string(),
        }),
    }
}

/// Signed decimal index. A negative value is integral and reported as out of
/// range by the caller, not as an invalid index.
fn parse_index(segment: &str) -> Result<i64, RefError> {
    segment.parse().map_err(|_| RefError::InvalidArrayIndex {
        segment: segment.to_string(),
    })
}

/// Walk `pointer` from `root` without following `$ref` nodes on the way.
///
/// The resolver does its own walk so it can dereference intermediate
/// references; this is the plain lookup for already-dereferenced documents.
pub fn navigate<'v>(root: &'v Value, pointer: &Pointer) -> Result<&'v Value, RefError> {
    pointer
        .segments()
        .iter()
        .try_fold(root, |node, segment| step(node, segment))
}
