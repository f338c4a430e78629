//! Pass 3: Responses
//!
//! Collapses each response's `content` map into a single `schema` (the first
//! JSON-compatible one, else the first of any kind), an `examples` map keyed by
//! media type, and the operation-level `produces` list. Header schemas are
//! flattened onto the header, since 2.0 headers are not Schema Objects.

use serde_json::{json, Map, Value};

use crate::error::ConvertError;
use crate::media_type;
use crate::resolver::build_path;

use super::p4_schema::{convert_schema, Direction};
use super::Context;

/// Header keywords lifted out of a header's nested `schema`.
const HEADER_SCHEMA_KEYS: &[&str] = &["type", "format", "items"];

pub fn convert_responses(
    operation: &mut Map<String, Value>,
    path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let mut produces: Vec<String> = operation
        .get("produces")
        .and_then(Value::as_array)
        .map(|types| types.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();
    let mut saw_media_type = false;

    let Some(Value::Object(responses)) = operation.get_mut("responses") else {
        return Ok(());
    };

    for (code, response) in responses.iter_mut() {
        let response_path = build_path(path, &["responses", code.as_str()]);
        *response = ctx.resolve_or_empty(std::mem::take(response), &response_path)?;
        let Some(response) = response.as_object_mut() else {
            continue;
        };

        if let Some(Value::Object(content)) = response.shift_remove("content") {
            for media_range in content.keys() {
                let media_type = media_type::normalize_range(media_range);
                if !produces.iter().any(|known| known == media_type) {
                    produces.push(media_type.to_string());
                }
                saw_media_type = true;
            }
            convert_content(response, content, &response_path, ctx)?;
        }

        if let Some(Value::Object(headers)) = response.get_mut("headers") {
            for (name, header) in headers.iter_mut() {
                let header_path = build_path(&response_path, &["headers", name.as_str()]);
                *header = ctx.resolve_or_empty(std::mem::take(header), &header_path)?;
                if let Some(header) = header.as_object_mut() {
                    flatten_header(header, &header_path, ctx)?;
                }
            }
        }
    }

    if saw_media_type {
        operation.insert("produces".to_string(), json!(produces));
    }
    Ok(())
}

/// Pick the response schema and collect examples from a `content` map.
fn convert_content(
    response: &mut Map<String, Value>,
    content: Map<String, Value>,
    response_path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let mut any_schema: Option<(Value, String)> = None;
    let mut json_schema: Option<(Value, String)> = None;
    let mut examples = Map::new();

    for (media_range, media) in content {
        let media_type = media_type::normalize_range(&media_range).to_string();
        let media_path = build_path(response_path, &["content", media_range.as_str()]);
        let Value::Object(mut media) = media else {
            continue;
        };

        if let Some(schema) = media.shift_remove("schema").filter(|s| !s.is_null()) {
            let schema_path = build_path(&media_path, &["schema"]);
            if json_schema.is_none() && media_type::is_json(&media_type) {
                json_schema = Some((schema.clone(), schema_path.clone()));
            }
            if any_schema.is_none() {
                any_schema = Some((schema, schema_path));
            }
        }

        if let Some(example) = media_example(&media, &media_path, ctx)? {
            examples.insert(media_type, example);
        }
    }

    if let Some((mut schema, schema_path)) = json_schema.or(any_schema) {
        ctx.resolver.ensure_local(&schema, &schema_path)?;
        convert_schema(&mut schema, Some(Direction::Response), &schema_path, 0, ctx)?;
        response.insert("schema".to_string(), schema);
    }

    if !examples.is_empty() {
        match response.get_mut("examples") {
            Some(Value::Object(existing)) => existing.extend(examples),
            _ => {
                response.insert("examples".to_string(), Value::Object(examples));
            }
        }
    }
    Ok(())
}

/// The inline `example`, else the `value` of the first entry in `examples`.
fn media_example(
    media: &Map<String, Value>,
    media_path: &str,
    ctx: &mut Context<'_>,
) -> Result<Option<Value>, ConvertError> {
    if let Some(example) = media.get("example").filter(|e| !e.is_null()) {
        return Ok(Some(example.clone()));
    }

    let Some((name, first)) = media
        .get("examples")
        .and_then(Value::as_object)
        .and_then(|examples| examples.iter().next())
    else {
        return Ok(None);
    };

    let example_path = build_path(media_path, &["examples", name.as_str()]);
    let resolved = ctx.resolver.resolve(first.clone(), &example_path)?;
    Ok(resolved.and_then(|example| example.get("value").cloned()))
}

fn flatten_header(
    header: &mut Map<String, Value>,
    header_path: &str,
    ctx: &mut Context<'_>,
) -> Result<(), ConvertError> {
    let Some(schema) = header.shift_remove("schema") else {
        return Ok(());
    };
    let schema = ctx
        .resolver
        .resolve(schema, &build_path(header_path, &["schema"]))?;

    if let Some(Value::Object(schema)) = schema {
        for key in HEADER_SCHEMA_KEYS {
            if let Some(value) = schema.get(*key) {
                header.insert((*key).to_string(), value.clone());
            }
        }
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
