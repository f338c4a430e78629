//! Property-based tests for conversion invariants.
//!
//! Generated documents combine a handful of component schemas (with optional
//! nullable / writeOnly / discriminator decorations), operations that point at
//! them, and arrays of parameters with random `style`/`explode` pairs. For all
//! of them:
//!
//! - the input is never mutated;
//! - conversion is deterministic;
//! - no `$ref` into `#/components/` survives;
//! - `swagger` is always the first key.
//!
//! A second group feeds structurally broken documents (wrong value types in
//! known positions) and only asserts that `convert` never panics.

use openapi_downgrade_core::{convert, ConvertOptions};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// ===========================================================================
// Strategies
// ===========================================================================

const SCHEMA_NAMES: &[&str] = &["Todo", "User", "Tag", "Error"];

const STYLES: &[&str] = &[
    "form",
    "simple",
    "matrix",
    "label",
    "spaceDelimited",
    "pipeDelimited",
    "deepObject",
];

const LOCATIONS: &[&str] = &["query", "header", "path", "cookie"];

const MALFORMED_SLOTS: &[&str] = &[
    "servers",
    "paths",
    "path_item",
    "operation",
    "parameters",
    "requestBody",
    "content",
    "responses",
    "schema",
    "components",
    "securitySchemes",
    "discriminator",
    "flows",
];

fn arb_schema_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SCHEMA_NAMES)
}

fn arb_leaf_schema() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({ "type": "string" })),
        Just(json!({ "type": "integer", "format": "int64" })),
        Just(json!({ "type": "string", "nullable": true })),
        Just(json!({ "type": "string", "writeOnly": true })),
        Just(json!({ "type": "boolean", "deprecated": true })),
        arb_schema_name().prop_map(|name| json!({ "$ref": format!("#/components/schemas/{name}") })),
    ]
}

fn arb_schema() -> impl Strategy<Value = Value> {
    arb_leaf_schema().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::btree_map("[a-z]{1,6}", inner.clone(), 1..4).prop_map(|props| {
                json!({ "type": "object", "properties": props })
            }),
            inner.clone().prop_map(|items| json!({ "type": "array", "items": items })),
            prop::collection::vec(inner.clone(), 1..3).prop_map(|members| json!({ "allOf": members })),
            prop::collection::vec(inner, 1..3).prop_map(|members| {
                json!({ "oneOf": members, "discriminator": { "propertyName": "kind" } })
            }),
        ]
    })
}

fn arb_parameter() -> impl Strategy<Value = Value> {
    let style = prop::option::of(prop::sample::select(STYLES));
    let location = prop::sample::select(LOCATIONS);
    (
        "[a-z]{1,8}",
        location,
        style,
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(name, location, style, explode)| {
            let mut param = json!({
                "name": name,
                "in": location,
                "schema": { "type": "array", "items": { "type": "string" } }
            });
            if let Some(style) = style {
                param["style"] = json!(style);
            }
            if let Some(explode) = explode {
                param["explode"] = json!(explode);
            }
            param
        })
}

fn arb_operation() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(arb_parameter(), 0..3),
        prop::option::of(arb_schema()),
        arb_schema(),
        prop::option::of("[A-Za-z ]{1,20}"),
    )
        .prop_map(|(parameters, body, response, summary)| {
            let mut operation = json!({
                "parameters": parameters,
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": { "application/json": { "schema": response } }
                    },
                    "default": { "$ref": "#/components/responses/Error" }
                }
            });
            if let Some(body) = body {
                operation["requestBody"] = json!({
                    "content": { "application/json": { "schema": body } }
                });
            }
            if let Some(summary) = summary {
                operation["summary"] = json!(summary);
            }
            operation
        })
}

fn arb_document() -> impl Strategy<Value = Value> {
    (
        prop::collection::btree_map("/[a-z]{1,8}", arb_operation(), 1..4),
        prop::collection::vec(arb_schema(), SCHEMA_NAMES.len()),
        any::<bool>(),
    )
        .prop_map(|(operations, schemas, with_mapping)| {
            let mut paths = Map::new();
            for (template, operation) in operations {
                paths.insert(template, json!({ "get": operation }));
            }

            let mut components = Map::new();
            for (name, schema) in SCHEMA_NAMES.iter().zip(schemas) {
                components.insert((*name).to_string(), schema);
            }
            if with_mapping {
                components.insert(
                    "Animal".to_string(),
                    json!({
                        "type": "object",
                        "discriminator": {
                            "propertyName": "kind",
                            "mapping": { "todo": "Todo", "user": "#/components/schemas/User" }
                        }
                    }),
                );
            }

            json!({
                "openapi": "3.0.3",
                "info": { "title": "Generated", "version": "1.0.0" },
                "servers": [{ "url": "https://api.example.com/v2" }],
                "paths": paths,
                "components": {
                    "schemas": components,
                    "responses": {
                        "Error": {
                            "description": "Error",
                            "content": {
                                "application/json": { "schema": { "$ref": "#/components/schemas/Error" } }
                            }
                        }
                    }
                }
            })
        })
}

/// A document with one known slot replaced by a value of the wrong type.
fn arb_malformed_document() -> impl Strategy<Value = Value> {
    let bad_value = prop_oneof![
        Just(json!(null)),
        Just(json!(42)),
        Just(json!("bad")),
        Just(json!([1, 2])),
        Just(json!({ "$ref": 7 })),
        Just(json!({ "$ref": "#/nowhere" })),
    ];
    let slot = prop::sample::select(MALFORMED_SLOTS);

    (slot, bad_value).prop_map(|(slot, bad)| {
        let mut doc = json!({
            "servers": [{ "url": "https://api.example.com" }],
            "paths": {
                "/a": {
                    "post": {
                        "parameters": [{ "name": "q", "in": "query", "schema": { "type": "string" } }],
                        "requestBody": { "content": { "application/json": { "schema": { "type": "object" } } } },
                        "responses": {
                            "200": { "description": "OK", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/S" } } } }
                        }
                    }
                }
            },
            "components": {
                "schemas": { "S": { "type": "object", "discriminator": { "propertyName": "k" } } },
                "securitySchemes": { "o": { "type": "oauth2", "flows": { "implicit": { "scopes": {} } } } }
            }
        });
        let op = "/paths/~1a/post";
        let pointer = match slot {
            "servers" => "/servers".to_string(),
            "paths" => "/paths".to_string(),
            "path_item" => "/paths/~1a".to_string(),
            "operation" => op.to_string(),
            "parameters" => format!("{op}/parameters"),
            "requestBody" => format!("{op}/requestBody"),
            "content" => format!("{op}/requestBody/content"),
            "responses" => format!("{op}/responses"),
            "schema" => format!("{op}/responses/200/content/application~1json/schema"),
            "components" => "/components".to_string(),
            "securitySchemes" => "/components/securitySchemes".to_string(),
            "discriminator" => "/components/schemas/S/discriminator".to_string(),
            _ => "/components/securitySchemes/o/flows".to_string(),
        };
        if let Some(target) = doc.pointer_mut(&pointer) {
            *target = bad;
        }
        doc
    })
}

// ===========================================================================
// Helpers
// ===========================================================================

fn has_component_ref(node: &Value) -> bool {
    match node {
        Value::Object(obj) => obj.iter().any(|(key, value)| match (key.as_str(), value) {
            ("$ref", Value::String(reference)) => reference.starts_with("#/components/"),
            _ => has_component_ref(value),
        }),
        Value::Array(arr) => arr.iter().any(has_component_ref),
        _ => false,
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..Default::default() })]

    #[test]
    fn convert_never_mutates_input(doc in arb_document()) {
        let before = doc.clone();
        let _ = convert(&doc, &ConvertOptions::default());
        prop_assert_eq!(doc, before);
    }

    #[test]
    fn convert_is_deterministic(doc in arb_document()) {
        let opts = ConvertOptions::default();
        let first = convert(&doc, &opts).unwrap();
        let second = convert(&doc, &opts).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&first.document).unwrap(),
            serde_json::to_string(&second.document).unwrap()
        );
        prop_assert_eq!(first.warnings, second.warnings);
    }

    #[test]
    fn no_component_refs_survive(doc in arb_document()) {
        let result = convert(&doc, &ConvertOptions::default()).unwrap();
        prop_assert!(!has_component_ref(&result.document));
        prop_assert!(result.document.get("components").is_none());
    }

    #[test]
    fn swagger_key_comes_first(doc in arb_document()) {
        let result = convert(&doc, &ConvertOptions::default()).unwrap();
        let first_key = result.document.as_object().and_then(|obj| obj.keys().next().cloned());
        prop_assert_eq!(first_key.as_deref(), Some("swagger"));
    }

    #[test]
    fn array_parameters_lose_style(doc in arb_document()) {
        let result = convert(&doc, &ConvertOptions::default()).unwrap();
        let paths = result.document["paths"].as_object().cloned().unwrap_or_default();
        for item in paths.values() {
            for param in item["get"]["parameters"].as_array().into_iter().flatten() {
                prop_assert!(param.get("style").is_none());
                prop_assert!(param.get("explode").is_none());
                prop_assert!(param.get("schema").is_none());
            }
        }
    }

    #[test]
    fn convert_never_panics_on_malformed(doc in arb_malformed_document()) {
        let _ = convert(&doc, &ConvertOptions::default());
    }

    #[test]
    fn convert_errors_have_messages(doc in arb_malformed_document()) {
        if let Err(err) = convert(&doc, &ConvertOptions::default()) {
            prop_assert!(!err.to_string().is_empty());
        }
    }
}
