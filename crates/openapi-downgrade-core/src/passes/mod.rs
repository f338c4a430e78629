//! Conversion pass modules.
//!
//! Each pass handles one structural concern of the OpenAPI 3.0 → Swagger 2.0
//! conversion. Passes run in order (0-6) over the owned working copy; later
//! passes assume the shapes produced by earlier ones. Passes 2-4 are also
//! invoked per operation from pass 1.

pub mod p0_metadata;
pub mod p1_operations;
pub mod p2_parameters;
pub mod p3_responses;
pub mod p4_schema;
pub mod p5_security;
pub mod p6_refs;

use serde_json::{Map, Value};

use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::resolver::{MaybeRef, Resolver};
use crate::warning::{Warning, WarningKind};

use p4_schema::DiscriminatorStamp;

/// State shared by every pass of a single conversion call.
///
/// References are always resolved against the untouched input document, never
/// against the working copy being mutated.
pub struct Context<'a> {
    pub resolver: Resolver<'a>,
    pub options: &'a ConvertOptions,
    pub warnings: Vec<Warning>,
    /// Discriminator values waiting to be stamped onto their target schemas.
    pub stamps: Vec<DiscriminatorStamp>,
}

impl<'a> Context<'a> {
    pub fn new(source: &'a Value, options: &'a ConvertOptions) -> Self {
        Self {
            resolver: Resolver::new(source),
            options,
            warnings: Vec::new(),
            stamps: Vec::new(),
        }
    }

    /// Record a recoverable problem and log it.
    pub fn warn(&mut self, path: String, kind: WarningKind, message: String) {
        tracing::warn!(path = %path, "{}", message);
        self.warnings.push(Warning {
            path,
            kind,
            message,
        });
    }

    /// Resolve a possibly-referenced node, degrading to `{}` when the local
    /// target is missing or the node is `null`.
    pub fn resolve_or_empty(&mut self, node: Value, path: &str) -> Result<Value, ConvertError> {
        let reference = match MaybeRef::classify(&node) {
            MaybeRef::Ref(reference) => Some(reference.to_string()),
            MaybeRef::Inline(_) => None,
        };
        let Some(reference) = reference else {
            return Ok(if node.is_null() { Value::Object(Map::new()) } else { node });
        };

        match self.resolver.lookup(&reference, path)? {
            Some(target) => Ok(target.clone()),
            None => {
                self.warn(
                    path.to_string(),
                    WarningKind::UnresolvedReference {
                        reference: reference.clone(),
                    },
                    format!("Unable to resolve {reference}; using an empty object."),
                );
                Ok(Value::Object(Map::new()))
            }
        }
    }
}
