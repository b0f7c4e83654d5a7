//! Core types for reference resolution.

use serde_json::Value;

/// Property that marks an object as a reference node.
pub const REF_KEY: &str = "$ref";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the `$ref` string if `value` is a reference node.
///
/// Any object whose `$ref` property is a string counts; a non-string
/// `$ref` (e.g. a property literally named `$ref` in a schema's
/// `properties`) is an ordinary object.
pub fn reference_target(value: &Value) -> Option<&str> {
    value.as_object()?.get(REF_KEY)?.as_str()
}

/// Whether `value` is a reference node.
pub fn is_reference(value: &Value) -> bool {
    reference_target(value).is_some()
}

/// Options for a resolution pass.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Reuse documents fetched earlier in the same pass instead of
    /// fetching them again for every `$ref`. Defaults to true.
    pub cache_documents: bool,
    /// Fail references that loop back onto a target still being resolved.
    /// Defaults to true. When off, a cyclic document recurses without bound.
    pub detect_cycles: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            cache_documents: true,
            detect_cycles: true,
        }
    }
}

impl ResolveOptions {
    /// Create options with caching and cycle detection enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the per-pass document cache.
    pub fn cache_documents(mut self, cache: bool) -> Self {
        self.cache_documents = cache;
        self
    }

    /// Enable or disable cycle detection.
    pub fn detect_cycles(mut self, detect: bool) -> Self {
        self.detect_cycles = detect;
        self
    }
}
