//! Error types for reference resolution and document loading.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single `$ref` could not be resolved.
///
/// Every variant is local to the reference that produced it: the resolver
/// records it, substitutes `null` and carries on with the rest of the tree.
#[derive(Debug, Error)]
pub enum RefError {
    #[error("invalid reference URI \"{reference}\": {source}")]
    MalformedReferenceUri {
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot combine \"{reference}\" with base {base}: {source}")]
    UriCombineFailure {
        reference: String,
        base: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to fetch {url}: {source}")]
    FetchFailure {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("document at {url} is not valid JSON: {source}")]
    RemoteParseFailure {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("array index \"{segment}\" is not an integer")]
    InvalidArrayIndex { segment: String },

    #[error("array index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("no property \"{key}\" on object")]
    MissingProperty { key: String },

    #[error("cannot index into {actual} with \"{segment}\"")]
    CannotIndexScalar { segment: String, actual: String },

    #[error("reference cycle through {target}")]
    CycleDetected { target: String },
}

/// Errors raised by a [`Fetcher`](crate::Fetcher) implementation.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[cfg(feature = "remote")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported URL scheme \"{scheme}\"")]
    UnsupportedScheme { scheme: String },
}

/// Errors loading the top-level document handed to the resolver.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    // Parse errors (exit code 2)
    #[error("invalid document location \"{location}\": {message}")]
    InvalidLocation { location: String, message: String },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::Fetch { .. } => 3,
            _ => 2,
        }
    }
}

/// A reference that failed to resolve, with its location in the output tree.
#[derive(Debug)]
pub struct RefFailure {
    /// JSON Pointer (RFC 6901) to the `null` placeholder in the resolved document.
    pub path: String,
    /// The `$ref` string as written in the document.
    pub reference: String,
    pub error: RefError,
}

impl std::fmt::Display for RefFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} ($ref \"{}\"): {}", path, self.reference, self.error)
    }
}

/// Returned by [`Resolution::into_result`](crate::Resolution::into_result)
/// when at least one reference failed.
#[derive(Debug, Error)]
#[error("{} reference(s) could not be resolved", failures.len())]
pub struct UnresolvedRefs {
    /// The partially resolved document, with `null` placeholders.
    pub value: serde_json::Value,
    pub failures: Vec<RefFailure>,
}
