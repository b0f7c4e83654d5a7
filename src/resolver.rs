//! Reference resolution - replaces every `$ref` node with the value it points to.
//!
//! The pass owns the output tree and mutates it in place. Navigation never
//! looks at the output tree: each document is read through an immutable
//! snapshot ([`Document`]), so a target is always located in its unresolved
//! form and then resolved on its own copy.

use std::borrow::Cow;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{RefError, RefFailure, UnresolvedRefs};
use crate::fetch::Fetcher;
use crate::loader::{combine, is_same_document, Document, DocumentLoader};
use crate::pointer::{child_path, step, Pointer};
use crate::types::{reference_target, ResolveOptions};

/// Output of a resolution pass.
#[derive(Debug)]
pub struct Resolution {
    /// The dereferenced document. References that failed are `null`.
    pub value: Value,
    /// One entry per failed reference, in traversal order.
    pub failures: Vec<RefFailure>,
}

impl Resolution {
    /// True when every reference resolved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The document if every reference resolved.
    ///
    /// # Errors
    ///
    /// Returns `UnresolvedRefs`, still carrying the partial document, if any
    /// reference failed.
    pub fn into_result(self) -> Result<Value, UnresolvedRefs> {
        if self.failures.is_empty() {
            Ok(self.value)
        } else {
            Err(UnresolvedRefs {
                value: self.value,
                failures: self.failures,
            })
        }
    }
}

/// Resolves `$ref` links in a document, fetching other documents as needed.
pub struct Resolver<'f> {
    fetcher: &'f dyn Fetcher,
    options: ResolveOptions,
}

impl<'f> Resolver<'f> {
    pub fn new(fetcher: &'f dyn Fetcher) -> Self {
        Self {
            fetcher,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Dereference `root`, which was loaded from `location`.
    ///
    /// Relative references resolve against `location`. Failures don't stop
    /// the pass; each one leaves `null` in place of its reference and an
    /// entry in [`Resolution::failures`].
    ///
    /// Only the targets reached from `root` are resolved in a fetched
    /// document, so broken references elsewhere in it are not reported.
    pub async fn resolve(&self, location: &Url, root: Value) -> Resolution {
        let doc = Document::new(location.clone(), root.clone());
        let mut pass = Pass {
            loader: DocumentLoader::new(self.fetcher, self.options.cache_documents),
            detect_cycles: self.options.detect_cycles,
            active: Vec::new(),
            failures: Vec::new(),
        };
        pass.loader.seed(&doc);

        let mut value = root;
        pass.resolve_value(&doc, "", &mut value).await;

        debug!(
            location = %doc.location,
            failures = pass.failures.len(),
            "resolution finished"
        );
        Resolution {
            value,
            failures: pass.failures,
        }
    }
}

/// Dereference `root` with default options.
pub async fn resolve_pointers(location: &Url, root: Value, fetcher: &dyn Fetcher) -> Resolution {
    Resolver::new(fetcher).resolve(location, root).await
}

/// State for one call to [`Resolver::resolve`].
struct Pass<'f> {
    loader: DocumentLoader<'f>,
    detect_cycles: bool,
    /// `document#pointer` keys of targets being located or resolved on the
    /// current branch.
    active: Vec<String>,
    failures: Vec<RefFailure>,
}

impl<'f> Pass<'f> {
    /// Resolve every reference reachable from `value`, in place.
    ///
    /// `path` is the JSON Pointer of `value` in the output tree.
    fn resolve_value<'a>(
        &'a mut self,
        doc: &'a Document,
        path: &'a str,
        value: &'a mut Value,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if let Some(reference) = reference_target(value).map(str::to_owned) {
                *value = match self.resolve_reference(doc, path, &reference).await {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        self.record(path, reference, error);
                        Value::Null
                    }
                };
                return;
            }

            match value {
                Value::Array(items) => {
                    for (index, item) in items.iter_mut().enumerate() {
                        let item_path = child_path(path, &index.to_string());
                        self.resolve_value(doc, &item_path, item).await;
                    }
                }
                Value::Object(map) => {
                    for (key, child) in map.iter_mut() {
                        let child_ptr = child_path(path, key);
                        self.resolve_value(doc, &child_ptr, child).await;
                    }
                }
                _ => {}
            }
        })
    }

    /// Locate the target of `reference` and resolve it on a fresh copy.
    ///
    /// Only a failure to locate the target fails the reference. Broken
    /// references nested inside the target are recorded at their own paths.
    fn resolve_reference<'a>(
        &'a mut self,
        doc: &'a Document,
        path: &'a str,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<Value, RefError>> {
        Box::pin(async move {
            debug!(path, reference, "resolving reference");
            let (target_doc, mut value, key) = self.locate(doc, reference).await?;

            self.active.push(key);
            self.resolve_value(&target_doc, path, &mut value).await;
            self.active.pop();

            Ok(value)
        })
    }

    /// Find the value `reference` points to, following reference chains.
    ///
    /// Returns the document the value was found in (nested relative refs
    /// resolve against it), an unresolved copy of the value, and its key.
    fn locate<'a>(
        &'a mut self,
        doc: &'a Document,
        reference: &'a str,
    ) -> BoxFuture<'a, Result<(Document, Value, String), RefError>> {
        Box::pin(async move {
            let target = combine(&doc.location, reference)?;
            let start = if is_same_document(&doc.location, &target) {
                doc.clone()
            } else {
                self.loader.load(&target).await?
            };

            let pointer = Pointer::from_fragment(target.fragment().unwrap_or_default());
            let key = format!("{}#{}", start.location, pointer);
            if self.detect_cycles && self.active.contains(&key) {
                return Err(RefError::CycleDetected { target: key });
            }

            self.active.push(key.clone());
            let walked = self.walk(start, &pointer).await;
            self.active.pop();

            let (found_in, value) = walked?;
            Ok((found_in, value, key))
        })
    }

    /// Navigate `pointer` from the root of `start`, dereferencing any
    /// reference met along the way, including at the root and the end.
    async fn walk(
        &mut self,
        start: Document,
        pointer: &Pointer,
    ) -> Result<(Document, Value), RefError> {
        let mut context = start.clone();
        let mut cursor: Cow<'_, Value> = Cow::Borrowed(start.root.as_ref());
        let mut segments = pointer.segments().iter();

        loop {
            if let Some(inner) = reference_target(&cursor).map(str::to_owned) {
                let (found_in, value, _) = self.locate(&context, &inner).await?;
                context = found_in;
                cursor = Cow::Owned(value);
            }

            let Some(segment) = segments.next() else {
                break;
            };
            cursor = match cursor {
                Cow::Borrowed(node) => Cow::Borrowed(step(node, segment)?),
                Cow::Owned(node) => Cow::Owned(step(&node, segment)?.clone()),
            };
        }

        Ok((context, cursor.into_owned()))
    }

    fn record(&mut self, path: &str, reference: String, error: RefError) {
        warn!(path, reference = %reference, error = %error, "unresolved reference");
        self.failures.push(RefFailure {
            path: path.to_string(),
            reference,
            error,
        });
    }
}
