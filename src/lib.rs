//! JSON Reference Resolver
//!
//! Dereferences `$ref` links in JSON documents such as OpenAPI specifications.
//!
//! Every object with a string `$ref` property is replaced by an independent
//! copy of the value it points to. Targets are found by JSON Pointer fragment
//! and may live in the same document (`#/components/schemas/Pet`), in a
//! relative document (`common.json#/Error`) or at an absolute URL, in which
//! case the document is fetched.
//!
//! # Example
//!
//! ```
//! use json_ref_resolver::{resolve_pointers, FileFetcher};
//! use serde_json::json;
//! use url::Url;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let doc = json!({
//!     "components": { "schemas": { "Id": { "type": "integer" } } },
//!     "properties": { "id": { "$ref": "#/components/schemas/Id" } }
//! });
//!
//! let location = Url::parse("file:///specs/api.json").unwrap();
//! let resolution = resolve_pointers(&location, doc, &FileFetcher).await;
//!
//! assert!(resolution.is_complete());
//! assert_eq!(resolution.value["properties"]["id"], json!({ "type": "integer" }));
//! # });
//! ```
//!
//! # Failures
//!
//! A reference that cannot be resolved never stops the pass. Its node becomes
//! `null` and a [`RefFailure`] naming its JSON Pointer is added to
//! [`Resolution::failures`]:
//!
//! | Error | Cause |
//! |-------|-------|
//! | `MalformedReferenceUri` | `$ref` is not a URI reference |
//! | `UriCombineFailure` | relative `$ref` against a base that can't take one |
//! | `FetchFailure` | transport error or non-2xx status |
//! | `RemoteParseFailure` | fetched body is not JSON |
//! | `InvalidArrayIndex` | non-numeric pointer segment into an array |
//! | `IndexOutOfRange` | array index past the end |
//! | `MissingProperty` | object has no such key |
//! | `CannotIndexScalar` | pointer continues past a string, number, bool or null |
//! | `CycleDetected` | reference loops back onto itself |

mod error;
mod fetch;
mod loader;
mod pointer;
mod resolver;
mod types;

pub use error::{FetchError, LoadError, RefError, RefFailure, UnresolvedRefs};
pub use fetch::{DefaultFetcher, FetchResponse, Fetcher, FileFetcher};
pub use loader::{combine, is_same_document, is_url, load_source, parse_document, Document};
pub use pointer::{escape, navigate, step, Pointer};
pub use resolver::{resolve_pointers, Resolution, Resolver};
pub use types::{is_reference, json_type_name, reference_target, ResolveOptions, REF_KEY};

#[cfg(feature = "remote")]
pub use fetch::HttpFetcher;
