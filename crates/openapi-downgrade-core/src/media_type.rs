//! Media type classification shared by request body and response conversion.

use std::sync::LazyLock;

use regex::Regex;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Stand-in for wildcard media ranges in `produces`.
pub const OCTET_STREAM: &str = "application/octet-stream";

// `application/json` or any `type/subtype+json`, optionally followed by parameters.
static JSON_MIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(application/json|[^;/ \t]+/[^;/ \t]+[+]json)[ \t]*(;.*)?$")
        .expect("JSON MIME pattern is valid")
});

pub fn is_json(media_type: &str) -> bool {
    JSON_MIME.is_match(media_type)
}

pub fn is_form(media_type: &str) -> bool {
    media_type == FORM_URLENCODED || media_type == MULTIPART_FORM_DATA
}

/// Media types that can be carried by a Swagger 2.0 request parameter.
pub fn is_supported_request(media_type: &str) -> bool {
    is_form(media_type) || is_json(media_type)
}

/// Normalize a media range for `produces`; wildcards have no 2.0 meaning.
pub fn normalize_range(media_range: &str) -> &str {
    if media_range.contains('*') {
        OCTET_STREAM
    } else {
        media_range
    }
}
