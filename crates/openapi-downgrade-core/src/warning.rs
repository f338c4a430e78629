//! Warning types emitted for recoverable conversion problems.

use serde::{Deserialize, Serialize};

/// A non-fatal problem found while converting a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Location in the input document (e.g. "#/paths/~1pets/get/requestBody").
    pub path: String,
    /// Classification of the warning.
    pub kind: WarningKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of conversion warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarningKind {
    /// A `discriminator.mapping` value was not a string.
    InvalidDiscriminatorMapping { payload: String },
    /// A `discriminator.mapping` value did not resolve to a schema.
    UnresolvedDiscriminatorMapping { payload: String, target: String },
    /// A local `$ref` pointed at nothing; the node was replaced with `{}`.
    UnresolvedReference { reference: String },
    /// `requestBody.content` had no JSON or form media type.
    UnsupportedRequestBody,
    /// The first server URL could not be parsed.
    InvalidServerUrl { url: String },
    /// A security scheme with no Swagger 2.0 equivalent was passed through.
    UnsupportedSecurityScheme { scheme_type: String },
    /// A schema nested past `max_depth`; its remainder was left unconverted.
    SchemaTooDeep { max_depth: usize },
}
