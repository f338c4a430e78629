//! Pass 1: Paths and operations
//!
//! Walks every Path Item, resolving it (and each operation) if it is a
//! reference, then converts path-level parameters and, per operation, the
//! request body, parameters and responses. Keys that are not one of the eight
//! HTTP methods (e.g. `x-summary`, `servers`) pass through untouched.

use heck::ToUpperCamelCase;
use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::resolver::build_path;

use super::{p2_parameters, p3_responses, Context};

pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

pub fn convert_paths(root: &mut Map<String, Value>, ctx: &mut Context<'_>) -> Result<(), ConvertError> {
    let Some(Value::Object(paths)) = root.get_mut("paths") else {
        return Ok(());
    };

    for (template, item) in paths.iter_mut() {
        let item_path = build_path("#/paths", &[template.as_str()]);
        *item = ctx.resolve_or_empty(std::mem::take(item), &item_path)?;
        let Some(item) = item.as_object_mut() else {
            continue;
        };

        p2_parameters::convert_parameters(item, &item_path, ctx)?;

        for (method, operation) in item.iter_mut() {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let operation_path = build_path(&item_path, &[method.as_str()]);
            *operation = ctx.resolve_or_empty(std::mem::take(operation), &operation_path)?;
            if let Some(operation) = operation.as_object_mut() {
                tracing::debug!(path = %operation_path, "converting operation");
                convert_operation(operation, method, template, &operation_path, ctx)?;
            }
        }
    }
    Ok(())
}

fn convert_operation(
    operation: &mut Map<String, Value>,
    method: &str,
    template: &str,
    path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let has_id = operation
        .get("operationId")
        .is_some_and(|id| !id.is_null() && id.as_str() != Some(""));
    if !has_id {
        let summary = operation
            .get("summary")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());
        let id = synthesize_operation_id(method, summary.unwrap_or(template));
        operation.insert("operationId".to_string(), Value::String(id));
    }

    p2_parameters::convert_request_body(operation, path, ctx)?;
    p2_parameters::convert_parameters(operation, path, ctx)?;
    p3_responses::convert_responses(operation, path, ctx)?;
    Ok(())
}

/// Camel-case `method` + `label` with a leading capital.
///
/// Deterministic, but two operations may end up with the same id.
pub fn synthesize_operation_id(method: &str, label: &str) -> String {
    format!("{method}{label}").to_upper_camel_case()
}
