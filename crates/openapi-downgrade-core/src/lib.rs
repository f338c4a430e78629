//! Convert OpenAPI 3.0 documents into Swagger 2.0 documents.
//!
//! [`convert`] takes a fully built OpenAPI 3.0 document tree and returns an
//! equivalent Swagger 2.0 tree. The input is never touched: the pipeline works
//! on its own deep copy and resolves every `$ref` against the untouched input.
//!
//! The mapping is lossy where 2.0 has no equivalent construct (`oneOf` /
//! `anyOf`, extra servers, extra OAuth2 flows, write-only properties in
//! responses). Recoverable problems are reported in
//! [`ConvertResult::warnings`]; a remote `$ref` aborts the whole call.
//!
//! ```
//! use openapi_downgrade_core::{convert, ConvertOptions};
//! use serde_json::json;
//!
//! let openapi = json!({
//!     "openapi": "3.0.3",
//!     "info": { "title": "Todos", "version": "1.0.0" },
//!     "servers": [{ "url": "https://api.example.com/v1" }],
//!     "paths": {}
//! });
//!
//! let result = convert(&openapi, &ConvertOptions::default()).unwrap();
//! assert_eq!(result.document["swagger"], "2.0");
//! assert_eq!(result.document["host"], "api.example.com");
//! assert_eq!(result.document["basePath"], "/v1");
//! ```

pub mod config;
pub mod error;
pub mod media_type;
pub mod passes;
pub mod resolver;
pub mod warning;

pub use config::ConvertOptions;
pub use error::ConvertError;
pub use resolver::{build_path, split_path, MaybeRef, Resolver};
pub use warning::{Warning, WarningKind};

use serde::Serialize;
use serde_json::{Map, Value};

use passes::{p0_metadata, p1_operations, p4_schema, p5_security, p6_refs, Context};

/// Keys emitted first, in this order, at the top of a converted document.
const LEADING_KEYS: &[&str] = &["info", "host", "basePath", "schemes"];

/// Result of a successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    /// The Swagger 2.0 document.
    pub document: Value,
    /// Recoverable problems met along the way, in discovery order.
    pub warnings: Vec<Warning>,
}

/// Convert an OpenAPI 3.0 document into a Swagger 2.0 document.
///
/// # Errors
///
/// [`ConvertError::RemoteReference`] for any `$ref` outside the document,
/// wherever it appears. Everything else is reported through `warnings`.
pub fn convert(document: &Value, options: &ConvertOptions) -> Result<ConvertResult, ConvertError> {
    let Value::Object(source_root) = document else {
        return Ok(ConvertResult {
            document: document.clone(),
            warnings: Vec::new(),
        });
    };

    let mut ctx = Context::new(document, options);
    let mut root = source_root.clone();

    tracing::debug!("pass 0: servers");
    p0_metadata::convert_servers(&mut root, &mut ctx);

    tracing::debug!("pass 1: paths");
    p1_operations::convert_paths(&mut root, &mut ctx)?;

    tracing::debug!("pass 4: component schemas");
    p4_schema::convert_component_schemas(&mut root, &mut ctx)?;
    p4_schema::apply_discriminator_stamps(&mut root, &mut ctx);

    let relocated = match root.shift_remove("components") {
        Some(Value::Null) | None => false,
        Some(components) => {
            tracing::debug!("pass 5: relocating components");
            relocate_components(&mut root, components, &mut ctx);
            true
        }
    };

    tracing::debug!("pass 6: checking and rewriting references");
    for (key, value) in root.iter_mut() {
        p6_refs::rewrite_refs(value, &build_path("#", &[key.as_str()]), relocated)?;
    }

    Ok(ConvertResult {
        document: Value::Object(order_keys(root)),
        warnings: ctx.warnings,
    })
}

/// Move `components` content to its 2.0 home: `definitions`,
/// `securityDefinitions`, and `x-components` for everything else.
fn relocate_components(root: &mut Map<String, Value>, components: Value, ctx: &mut Context<'_>) {
    let Value::Object(mut components) = components else {
        root.insert("x-components".to_string(), components);
        return;
    };

    if let Some(schemas) = components.shift_remove("schemas") {
        root.insert("definitions".to_string(), schemas);
    }

    if let Some(mut schemes) = components.shift_remove("securitySchemes") {
        if let Value::Object(schemes) = &mut schemes {
            p5_security::convert_security_schemes(schemes, ctx);
        }
        root.insert("securityDefinitions".to_string(), schemes);
    }

    if !components.is_empty() {
        root.insert("x-components".to_string(), Value::Object(components));
    }
}

fn order_keys(mut root: Map<String, Value>) -> Map<String, Value> {
    root.shift_remove("swagger");

    let mut ordered = Map::new();
    ordered.insert("swagger".to_string(), Value::String("2.0".to_string()));
    for key in LEADING_KEYS {
        if let Some(value) = root.shift_remove(*key) {
            ordered.insert((*key).to_string(), value);
        }
    }
    ordered.extend(root);
    ordered
}
