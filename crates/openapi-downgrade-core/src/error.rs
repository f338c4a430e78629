//! Error types for document conversion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Remote $ref URLs are not supported (at {path}): {reference}")]
    RemoteReference { path: String, reference: String },
}
