//! Document loading.
//!
//! Turns `$ref` strings into absolute URLs, decides whether a target lives in
//! the current document, and fetches and parses the ones that don't.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{FetchError, LoadError, RefError};
use crate::fetch::Fetcher;

/// A parsed document and the location it was loaded from.
#[derive(Debug, Clone)]
pub struct Document {
    /// Absolute URL without fragment; relative refs inside resolve against it.
    pub location: Url,
    pub root: Arc<Value>,
}

impl Document {
    pub fn new(mut location: Url, root: Value) -> Self {
        location.set_fragment(None);
        Self {
            location,
            root: Arc::new(root),
        }
    }
}

/// Parse document text as JSON.
pub fn parse_document(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Resolve a `$ref` string against the location of the document containing it.
///
/// # Errors
///
/// `MalformedReferenceUri` if the string is not a URI reference at all,
/// `UriCombineFailure` if it is relative and `base` cannot serve as a base.
pub fn combine(base: &Url, reference: &str) -> Result<Url, RefError> {
    match Url::parse(reference) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.join(reference)
                .map_err(|source| RefError::UriCombineFailure {
                    reference: reference.to_string(),
                    base: base.to_string(),
                    source,
                })
        }
        Err(source) => Err(RefError::MalformedReferenceUri {
            reference: reference.to_string(),
            source,
        }),
    }
}

/// Whether `target` points into the document loaded from `current`.
///
/// Compares host and path, ignoring ASCII case. Scheme, port and query are
/// not considered.
pub fn is_same_document(current: &Url, target: &Url) -> bool {
    let same_host = match (current.host_str(), target.host_str()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    };
    same_host && current.path().eq_ignore_ascii_case(target.path())
}

/// Fetches cross-document targets for one resolution pass.
///
/// With caching on, each document is fetched at most once per pass.
pub(crate) struct DocumentLoader<'f> {
    fetcher: &'f dyn Fetcher,
    cache: Option<HashMap<String, Document>>,
}

impl<'f> DocumentLoader<'f> {
    pub(crate) fn new(fetcher: &'f dyn Fetcher, cache_documents: bool) -> Self {
        Self {
            fetcher,
            cache: cache_documents.then(HashMap::new),
        }
    }

    /// Register a document that is already in memory, so references back
    /// into it are not fetched.
    pub(crate) fn seed(&mut self, doc: &Document) {
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(doc.location.to_string(), doc.clone());
        }
    }

    /// Fetch and parse the document `target` lives in (fragment ignored).
    pub(crate) async fn load(&mut self, target: &Url) -> Result<Document, RefError> {
        let mut location = target.clone();
        location.set_fragment(None);
        let key = location.to_string();

        if let Some(doc) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(url = %key, "document cache hit");
            return Ok(doc.clone());
        }

        debug!(url = %key, "fetching document");
        let response = self
            .fetcher
            .fetch(&location)
            .await
            .map_err(|source| RefError::FetchFailure {
                url: key.clone(),
                source,
            })?;

        if !response.is_success() {
            return Err(RefError::FetchFailure {
                url: key,
                source: FetchError::Status {
                    status: response.status,
                },
            });
        }

        let root = parse_document(&response.body).map_err(|source| {
            RefError::RemoteParseFailure {
                url: key.clone(),
                source,
            }
        })?;

        let doc = Document::new(location, root);
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(key, doc.clone());
        }
        Ok(doc)
    }
}

/// Check if a string looks like a URL the fetcher can load.
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("file://")
}

/// Load the top-level document from a file path or URL.
///
/// File paths are canonicalized and turned into `file://` URLs so relative
/// references inside them resolve against the file's directory.
///
/// # Errors
///
/// `FileNotFound`/`ReadError` for unreadable files, `Fetch` for failed or
/// non-success fetches, `InvalidJson` if the content isn't JSON.
pub async fn load_source(source: &str, fetcher: &dyn Fetcher) -> Result<(Url, Value), LoadError> {
    if is_url(source) {
        let mut url = Url::parse(source).map_err(|e| LoadError::InvalidLocation {
            location: source.to_string(),
            message: e.to_string(),
        })?;
        url.set_fragment(None);
        let response = fetcher
            .fetch(&url)
            .await
            .map_err(|source| LoadError::Fetch {
                url: url.to_string(),
                source,
            })?;
        if !response.is_success() {
            return Err(LoadError::Fetch {
                url: url.to_string(),
                source: FetchError::Status {
                    status: response.status,
                },
            });
        }
        let root = parse_document(&response.body)
            .map_err(|source| LoadError::InvalidJson { source })?;
        return Ok((url, root));
    }

    load_file(Path::new(source)).await
}

async fn load_file(path: &Path) -> Result<(Url, Value), LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let canonical = path.canonicalize().map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let content = tokio::fs::read_to_string(&canonical)
        .await
        .map_err(|source| LoadError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

    let url = Url::from_file_path(&canonical).map_err(|()| LoadError::InvalidLocation {
        location: canonical.display().to_string(),
        message: "not an absolute path".to_string(),
    })?;

    let root = parse_document(&content).map_err(|source| LoadError::InvalidJson { source })?;
    Ok((url, root))
}
