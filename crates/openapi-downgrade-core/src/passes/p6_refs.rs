//! Pass 6: Reference rewrite
//!
//! Runs last, over the whole output tree, so `$ref`s introduced by earlier
//! passes are covered too. Schema references move to `#/definitions/`; any
//! other component reference moves to `#/x-components/`. A `$ref` that is not
//! fragment-local fails here even if no earlier pass looked at its node.

use serde_json::Value;

use crate::error::ConvertError;
use crate::resolver::build_path;

/// Walk `node`, rejecting remote references and, when `relocate` is set,
/// moving `#/components/...` references to their 2.0 location.
///
/// `path` locates `node` in the output document.
pub fn rewrite_refs(node: &mut Value, path: &str, relocate: bool) -> Result<(), ConvertError> {
    match node {
        Value::Object(obj) => {
            for (key, value) in obj.iter_mut() {
                if key != "$ref" {
                    rewrite_refs(value, &build_path(path, &[key.as_str()]), relocate)?;
                    continue;
                }
                let Value::String(reference) = value else {
                    continue;
                };
                if !reference.starts_with('#') {
                    return Err(ConvertError::RemoteReference {
                        path: path.to_string(),
                        reference: reference.clone(),
                    });
                }
                if relocate {
                    if let Some(rewritten) = rewrite_ref(reference) {
                        *reference = rewritten;
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (idx, item) in arr.iter_mut().enumerate() {
                rewrite_refs(item, &build_path(path, &[&idx.to_string()]), relocate)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// The 2.0 location of a `#/components/...` reference, if it needs moving.
pub fn rewrite_ref(reference: &str) -> Option<String> {
    if let Some(name) = reference.strip_prefix("#/components/schemas/") {
        return Some(format!("#/definitions/{name}"));
    }
    reference
        .strip_prefix("#/components/")
        .map(|rest| format!("#/x-components/{rest}"))
}
