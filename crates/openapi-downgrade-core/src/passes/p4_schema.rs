//! Pass 4: Schema dialect conversion
//!
//! Rewrites an OpenAPI 3.0 Schema Object into its Swagger 2.0 form:
//!
//! - `oneOf` / `anyOf` are dropped together with any sibling `discriminator`
//!   (2.0 has no union types).
//! - `allOf` members are converted recursively.
//! - An object `discriminator` collapses to its `propertyName` string. Its
//!   `mapping` entries become [`DiscriminatorStamp`]s, applied later to the
//!   target schemas as `x-discriminator-value` / `x-ms-discriminator-value`.
//! - `writeOnly` properties are removed from response schemas and the flag is
//!   stripped everywhere else.
//! - `nullable` → `x-nullable`, `deprecated` → `x-deprecated`.
//! - A `$ref` outside the document fails the conversion. Schemas nested past
//!   `max_depth` are left as they are, with a warning.

use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::resolver::{build_path, split_path};
use crate::warning::WarningKind;

use super::Context;

/// Which side of an operation a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// A pending `discriminator.mapping` entry, resolved but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorStamp {
    /// Local `$ref` of the schema to stamp.
    pub target: String,
    /// Discriminator payload value selecting that schema.
    pub payload: String,
}

const COMPONENT_SCHEMAS: &str = "#/components/schemas";

/// Convert a schema in place.
///
/// `direction` is `None` for standalone component schemas, which keep their
/// `writeOnly` properties.
pub fn convert_schema(
    schema: &mut Value,
    direction: Option<Direction>,
    path: &str,
    depth: usize,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    ctx.resolver.ensure_local(schema, path)?;

    if depth > ctx.options.max_depth {
        let max_depth = ctx.options.max_depth;
        ctx.warn(
            path.to_string(),
            WarningKind::SchemaTooDeep { max_depth },
            format!("Schema nesting exceeds {max_depth} levels; leaving the rest unconverted."),
        );
        return Ok(());
    }

    let Some(obj) = schema.as_object_mut() else {
        return Ok(());
    };

    // --- Unions have no 2.0 equivalent ---
    let had_one_of = obj.shift_remove("oneOf").is_some();
    let had_any_of = obj.shift_remove("anyOf").is_some();
    if had_one_of || had_any_of {
        obj.shift_remove("discriminator");
    }

    if let Some(Value::Array(members)) = obj.get_mut("allOf") {
        for (idx, member) in members.iter_mut().enumerate() {
            let member_path = build_path(path, &["allOf", &idx.to_string()]);
            convert_schema(member, direction, &member_path, depth + 1, ctx)?;
        }
    }

    collapse_discriminator(obj, path, ctx);

    // --- Object properties, then items (object falls through to array) ---
    let schema_type = obj.get("type").and_then(Value::as_str);
    let is_object = schema_type == Some("object");
    let is_array = schema_type == Some("array");

    if is_object {
        if let Some(Value::Object(properties)) = obj.get_mut("properties") {
            if direction == Some(Direction::Response) {
                properties.retain(|_, property| !is_write_only(property));
            }
            for (name, property) in properties.iter_mut() {
                let property_path = build_path(path, &["properties", name.as_str()]);
                convert_schema(property, direction, &property_path, depth + 1, ctx)?;
                if let Some(property) = property.as_object_mut() {
                    property.shift_remove("writeOnly");
                }
            }
        }
    }

    if is_object || is_array {
        if let Some(items) = obj.get_mut("items") {
            let items_path = build_path(path, &["items"]);
            convert_schema(items, direction, &items_path, depth + 1, ctx)?;
        }
    }

    // --- Vendor-extension rewrites ---
    // Only `nullable: true` has an `x-nullable` form; any other value is dropped.
    if let Some(nullable) = obj.shift_remove("nullable") {
        if nullable.as_bool() == Some(true) {
            obj.insert("x-nullable".to_string(), Value::Bool(true));
        }
    }

    if let Some(deprecated) = obj.shift_remove("deprecated") {
        obj.insert("x-deprecated".to_string(), deprecated);
    }

    Ok(())
}

fn is_write_only(property: &Value) -> bool {
    property.get("writeOnly").and_then(Value::as_bool) == Some(true)
}

/// Replace an object discriminator with its bare property name.
///
/// String discriminators are already in 2.0 form and stay untouched.
fn collapse_discriminator(obj: &mut Map<String, Value>, path: &str, ctx: &mut Context<'_>) {
    let Some(Value::Object(discriminator)) = obj.get("discriminator") else {
        return;
    };

    if let Some(Value::Object(mapping)) = discriminator.get("mapping") {
        let mapping_path = build_path(path, &["discriminator", "mapping"]);
        collect_stamps(mapping, &mapping_path, ctx);
    }

    let property_name = discriminator.get("propertyName").cloned();
    match property_name {
        Some(property_name) => {
            obj.insert("discriminator".to_string(), property_name);
        }
        None => {
            obj.shift_remove("discriminator");
        }
    }
}

// ---------------------------------------------------------------------------
// Discriminator mapping
// ---------------------------------------------------------------------------

/// Bare component names contain only letters, digits, `.`, `_` and `-`.
fn is_schema_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Resolve each mapping entry and queue a stamp for it.
///
/// Bad entries are warned about and skipped; they never abort the conversion.
fn collect_stamps(mapping: &Map<String, Value>, mapping_path: &str, ctx: &mut Context<'_>) {
    for (payload, target) in mapping {
        let entry_path = build_path(mapping_path, &[payload.as_str()]);

        let Some(target) = target.as_str() else {
            ctx.warn(
                entry_path,
                WarningKind::InvalidDiscriminatorMapping {
                    payload: payload.clone(),
                },
                format!("Ignoring {target} for {payload} in discriminator.mapping."),
            );
            continue;
        };

        let reference = if is_schema_name(target) {
            format!("{COMPONENT_SCHEMAS}/{target}")
        } else {
            target.to_string()
        };

        let found = matches!(
            ctx.resolver.lookup(&reference, &entry_path),
            Ok(Some(Value::Object(_)))
        );
        if found {
            ctx.stamps.push(DiscriminatorStamp {
                target: reference,
                payload: payload.clone(),
            });
        } else {
            ctx.warn(
                entry_path,
                WarningKind::UnresolvedDiscriminatorMapping {
                    payload: payload.clone(),
                    target: target.to_string(),
                },
                format!("Unable to resolve {target} for {payload} in discriminator.mapping."),
            );
        }
    }
}

/// Write every queued stamp onto its target schema in the working document.
///
/// Must run while component schemas still live under `components`, since
/// stamp targets are expressed as `#/components/...` pointers.
pub fn apply_discriminator_stamps(root: &mut Map<String, Value>, ctx: &mut Context<'_>) {
    let stamps = std::mem::take(&mut ctx.stamps);
    for stamp in stamps {
        let segments = split_path(&stamp.target);
        match node_mut(root, &segments).and_then(Value::as_object_mut) {
            Some(target) => {
                tracing::debug!(target = %stamp.target, payload = %stamp.payload, "stamping discriminator value");
                target.insert(
                    "x-discriminator-value".to_string(),
                    Value::String(stamp.payload.clone()),
                );
                target.insert(
                    "x-ms-discriminator-value".to_string(),
                    Value::String(stamp.payload),
                );
            }
            None => ctx.warn(
                stamp.target.clone(),
                WarningKind::UnresolvedDiscriminatorMapping {
                    payload: stamp.payload.clone(),
                    target: stamp.target.clone(),
                },
                format!(
                    "Unable to stamp {} for {} in discriminator.mapping.",
                    stamp.target, stamp.payload
                ),
            ),
        }
    }
}

fn node_mut<'v>(root: &'v mut Map<String, Value>, segments: &[String]) -> Option<&'v mut Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get_mut(first)?;
    for segment in rest {
        current = match current {
            Value::Object(obj) => obj.get_mut(segment)?,
            Value::Array(arr) => arr.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Convert every schema under `components.schemas` with no direction.
pub fn convert_component_schemas(
    root: &mut Map<String, Value>,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let Some(Value::Object(components)) = root.get_mut("components") else {
        return Ok(());
    };
    let Some(Value::Object(schemas)) = components.get_mut("schemas") else {
        return Ok(());
    };

    for (name, schema) in schemas.iter_mut() {
        let schema_path = build_path(COMPONENT_SCHEMAS, &[name.as_str()]);
        convert_schema(schema, None, &schema_path, 0, ctx)?;
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
