//! Configuration for document conversion.

use serde::{Deserialize, Serialize};

/// Options for document conversion.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `max-depth`,
/// `infer-parameter-style`), matching the CLI flag names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConvertOptions {
    /// Maximum nesting depth for recursive schema conversion (stack overflow
    /// guard). Deeper subschemas are kept as-is with a warning.
    pub max_depth: usize,
    /// Fill in the OpenAPI 3 default `style` of an array parameter before
    /// deriving its `collectionFormat`. `query` and `cookie` parameters
    /// default to `form`, everything else to `simple`.
    pub infer_parameter_style: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_depth: 50,
            infer_parameter_style: false,
        }
    }
}
