//! Pass 2: Parameters and request bodies
//!
//! Swagger 2.0 has no Request Body Object, so `requestBody` is flattened into
//! parameters: one `in: body` parameter for JSON media types, or one
//! `in: formData` parameter per property for form media types.
//!
//! Non-body parameters lose their nested `schema`: its constraint keywords,
//! `type`/`items`, `x-` extensions and (if missing) `description` are hoisted
//! onto the parameter itself. Array parameters get a `collectionFormat`
//! derived from `style`/`explode`.

use serde_json::{json, Map, Value};

use crate::error::ConvertError;
use crate::media_type;
use crate::resolver::build_path;
use crate::warning::WarningKind;

use super::p4_schema::{convert_schema, Direction};
use super::Context;

/// Schema keywords that 2.0 allows directly on a non-body parameter.
const SCHEMA_PROPERTIES: &[&str] = &[
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "multipleOf",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "additionalProperties",
    "pattern",
    "enum",
    "default",
];

const ARRAY_PROPERTIES: &[&str] = &["type", "items"];

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// Replace `requestBody` with equivalent parameters and a `consumes` entry.
pub fn convert_request_body(
    operation: &mut Map<String, Value>,
    path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let Some(raw) = operation.shift_remove("requestBody") else {
        return Ok(());
    };
    let body_path = build_path(path, &["requestBody"]);
    let Value::Object(mut body) = ctx.resolve_or_empty(raw, &body_path)? else {
        return Ok(());
    };
    let Some(Value::Object(content)) = body.shift_remove("content") else {
        return Ok(());
    };

    // First JSON or form media type in declaration order wins.
    let Some((mime, media)) = content
        .into_iter()
        .find(|(mime, _)| media_type::is_supported_request(mime))
    else {
        ctx.warn(
            body_path,
            WarningKind::UnsupportedRequestBody,
            "No JSON or form media type in requestBody.content; dropping the request body."
                .to_string(),
        );
        return Ok(());
    };

    let schema_path = build_path(&body_path, &["content", mime.as_str(), "schema"]);
    let mut schema = media
        .get("schema")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    let is_form = media_type::is_form(&mime);
    let fields = if is_form {
        expand_form_fields(&schema, &schema_path, ctx)?
    } else {
        None
    };

    let new_parameters = match fields {
        Some(fields) => fields,
        None => {
            convert_schema(&mut schema, Some(Direction::Request), &schema_path, 0, ctx)?;
            let location = if is_form { "formData" } else { "body" };
            vec![body_parameter(body, location, schema)]
        }
    };

    match operation.get_mut("parameters") {
        Some(Value::Array(parameters)) => parameters.extend(new_parameters),
        _ => {
            operation.insert("parameters".to_string(), Value::Array(new_parameters));
        }
    }
    operation.insert("consumes".to_string(), json!([mime]));
    Ok(())
}

/// The single synthetic parameter carrying a whole request body.
fn body_parameter(body: Map<String, Value>, location: &str, schema: Value) -> Value {
    let mut param = Map::new();
    param.insert("name".to_string(), json!("body"));
    param.insert("in".to_string(), json!(location));
    for (key, value) in body {
        if key == "description" || key == "required" || key.starts_with("x-") {
            param.insert(key, value);
        }
    }
    param.insert("schema".to_string(), schema);
    Value::Object(param)
}

/// Split an object form schema into one `formData` parameter per property.
///
/// Returns `None` when the (resolved) schema is not an object with
/// `properties`. `readOnly` properties are skipped.
fn expand_form_fields(
    schema: &Value,
    schema_path: &str,
    ctx: &mut Context<'_>,
) -> Result<Option<Vec<Value>>, ConvertError> {
    let Some(mut resolved) = ctx.resolver.resolve(schema.clone(), schema_path)? else {
        return Ok(None);
    };
    let expandable = resolved.get("type").and_then(Value::as_str) == Some("object")
        && resolved.get("properties").is_some_and(Value::is_object);
    if !expandable {
        return Ok(None);
    }

    convert_schema(&mut resolved, Some(Direction::Request), schema_path, 0, ctx)?;

    let required: Vec<&str> = resolved
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut fields = Vec::new();
    let Some(Value::Object(properties)) = resolved.get("properties") else {
        return Ok(Some(fields));
    };

    for (name, property) in properties {
        let property_path = build_path(schema_path, &["properties", name.as_str()]);
        let Value::Object(property) = ctx.resolve_or_empty(property.clone(), &property_path)?
        else {
            continue;
        };
        if property.get("readOnly").and_then(Value::as_bool) == Some(true) {
            continue;
        }

        let mut field = Map::new();
        field.insert("name".to_string(), json!(name));
        field.insert("in".to_string(), json!("formData"));
        field.insert(
            "required".to_string(),
            json!(required.contains(&name.as_str())),
        );
        field.extend(property);
        fields.push(Value::Object(field));
    }
    Ok(Some(fields))
}

// ---------------------------------------------------------------------------
// Parameter arrays
// ---------------------------------------------------------------------------

/// Convert the `parameters` array of a Path Item or Operation in place.
pub fn convert_parameters(
    container: &mut Map<String, Value>,
    path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let Some(Value::Array(parameters)) = container.get_mut("parameters") else {
        return Ok(());
    };

    for (idx, param) in parameters.iter_mut().enumerate() {
        let param_path = build_path(path, &["parameters", &idx.to_string()]);
        *param = ctx.resolve_or_empty(std::mem::take(param), &param_path)?;
        if let Some(param) = param.as_object_mut() {
            convert_parameter(param, &param_path, ctx)?;
        }
    }
    Ok(())
}

fn convert_parameter(
    param: &mut Map<String, Value>,
    path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let location = param
        .get("in")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if location != "body" {
        let schema = match param.shift_remove("schema") {
            Some(schema) => ctx
                .resolver
                .resolve(schema, &build_path(path, &["schema"]))?,
            None => None,
        };

        if let Some(Value::Object(schema)) = &schema {
            hoist_schema_keywords(param, schema);
        }

        param.shift_remove("allowReserved");
        if let Some(example) = param.shift_remove("example") {
            param.insert("x-example".to_string(), example);
        }
    }

    if param.get("type").and_then(Value::as_str) == Some("array") {
        let style = param
            .get("style")
            .and_then(Value::as_str)
            .or_else(|| default_style(&location, ctx.options.infer_parameter_style));
        let explode = param.get("explode").and_then(Value::as_bool);

        match style.and_then(|style| collection_format(style, explode)) {
            Some(format) => {
                param.insert("collectionFormat".to_string(), json!(format));
            }
            None => {
                param.shift_remove("collectionFormat");
            }
        }
    }

    param.shift_remove("style");
    param.shift_remove("explode");
    Ok(())
}

fn hoist_schema_keywords(param: &mut Map<String, Value>, schema: &Map<String, Value>) {
    for key in SCHEMA_PROPERTIES.iter().chain(ARRAY_PROPERTIES) {
        if let Some(value) = schema.get(*key) {
            param.insert((*key).to_string(), value.clone());
        }
    }

    for (key, value) in schema {
        if key.starts_with("x-") && !param.contains_key(key) {
            param.insert(key.clone(), value.clone());
        }
    }

    let has_description = param
        .get("description")
        .and_then(Value::as_str)
        .is_some_and(|d| !d.is_empty());
    if !has_description {
        if let Some(description) = schema.get("description") {
            param.insert("description".to_string(), description.clone());
        }
    }
}

// OpenAPI 3 defaults: form for query/cookie, simple everywhere else.
fn default_style(location: &str, infer: bool) -> Option<&'static str> {
    if !infer {
        return None;
    }
    match location {
        "query" | "cookie" => Some("form"),
        _ => Some("simple"),
    }
}

/// Map an OpenAPI 3 `style`/`explode` pair to a 2.0 `collectionFormat`.
///
/// `None` means the combination has no 2.0 equivalent.
pub fn collection_format(style: &str, explode: Option<bool>) -> Option<&'static str> {
    let explode = explode == Some(true);
    match style {
        "matrix" if explode => None,
        "matrix" => Some("csv"),
        "label" => None,
        "simple" => Some("csv"),
        "spaceDelimited" => Some("ssv"),
        "pipeDelimited" => Some("pipes"),
        "deepObject" => Some("multi"),
        "form" if explode => Some("multi"),
        "form" => Some("csv"),
        _ => None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
