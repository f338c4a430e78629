//! Local `$ref` resolution for OpenAPI documents.
//!
//! [`Resolver`] is the single point where a `{ "$ref": ... }` node is
//! dereferenced, so the "remote references are fatal" rule lives in one place.
//!
//! Resolution is by value: every resolved node is a fresh deep copy of the
//! target, never a shared reference into the document, so callers may mutate
//! what they get back.
//!
//! ## Limitations
//!
//! - Only fragment-local JSON Pointers (`#/...`) are supported.
//! - A single hop is followed; a target that is itself a `$ref` is returned as is.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::ConvertError;

// ---------------------------------------------------------------------------
// JSON Pointer escaping (RFC 6901)
// ---------------------------------------------------------------------------

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending segments to a parent path.
///
/// # Example
/// ```
/// use openapi_downgrade_core::build_path;
/// assert_eq!(build_path("#/paths", &["/pets/{id}", "get"]), "#/paths/~1pets~1{id}/get");
/// ```
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

/// Unescape a single path segment per RFC 6901.
///
/// Order matters: unescape `~1` first to avoid double-unescaping.
pub fn unescape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains("~0") || segment.contains("~1") {
        Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Split a JSON Pointer path into decoded segments.
///
/// # Example
/// ```
/// use openapi_downgrade_core::split_path;
/// assert_eq!(split_path("#/components/schemas/a~1b"), vec!["components", "schemas", "a/b"]);
/// assert_eq!(split_path("#"), Vec::<String>::new());
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    let stripped = path.strip_prefix('#').unwrap_or(path);

    // An empty fragment refers to the whole document.
    if stripped.is_empty() {
        return Vec::new();
    }

    let mut segments_iter = stripped.split('/');

    // Skip the empty root segment produced by the leading "/".
    if stripped.starts_with('/') {
        segments_iter.next();
    }

    segments_iter
        .map(|s| unescape_pointer_segment(s).into_owned())
        .collect()
}

// ---------------------------------------------------------------------------
// MaybeRef
// ---------------------------------------------------------------------------

/// A document node that is either a `$ref` stand-in or an inline value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaybeRef<'a> {
    /// `{ "$ref": "<target>" }`; sibling keys are ignored.
    Ref(&'a str),
    Inline(&'a Value),
}

impl<'a> MaybeRef<'a> {
    pub fn classify(node: &'a Value) -> Self {
        match node.get("$ref").and_then(Value::as_str) {
            Some(reference) => MaybeRef::Ref(reference),
            None => MaybeRef::Inline(node),
        }
    }

    /// True for references that point outside the current document.
    pub fn is_remote(&self) -> bool {
        matches!(self, MaybeRef::Ref(reference) if !is_local(reference))
    }
}

fn is_local(reference: &str) -> bool {
    reference.starts_with('#')
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Dereferences local pointers against a fixed, read-only document root.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    root: &'a Value,
}

impl<'a> Resolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Walk a `$ref` string from the root.
    ///
    /// Returns `Ok(None)` when any segment is missing or the target is `null`,
    /// and `Err` for remote references. `path` locates the `$ref` for errors.
    pub fn lookup(&self, reference: &str, path: &str) -> Result<Option<&'a Value>, ConvertError> {
        if !is_local(reference) {
            return Err(ConvertError::RemoteReference {
                path: path.to_string(),
                reference: reference.to_string(),
            });
        }

        let mut current = self.root;
        for segment in split_path(reference) {
            let next = match current {
                Value::Object(obj) => obj.get(&segment),
                Value::Array(arr) => segment.parse::<usize>().ok().and_then(|idx| arr.get(idx)),
                _ => None,
            };
            match next {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }

        if current.is_null() {
            return Ok(None);
        }
        Ok(Some(current))
    }

    /// Resolve a node that may be a reference.
    ///
    /// Inline nodes are returned unchanged; references are replaced by a deep
    /// copy of their target, or `None` if the target does not exist.
    pub fn resolve(&self, node: Value, path: &str) -> Result<Option<Value>, ConvertError> {
        let target = match MaybeRef::classify(&node) {
            MaybeRef::Inline(_) => return Ok(Some(node)),
            MaybeRef::Ref(reference) => self.lookup(reference, path)?,
        };
        Ok(target.cloned())
    }

    /// Fail if `node` is a remote reference, without copying anything.
    pub fn ensure_local(&self, node: &Value, path: &str) -> Result<(), ConvertError> {
        match MaybeRef::classify(node) {
            MaybeRef::Ref(reference) if !is_local(reference) => {
                Err(ConvertError::RemoteReference {
                    path: path.to_string(),
                    reference: reference.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
