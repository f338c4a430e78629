#![no_main]

use libfuzzer_sys::fuzz_target;

// Arbitrary bytes -> JSON -> convert(). Goal: no panics, even on documents
// that are valid JSON but nonsense as OpenAPI.
fuzz_target!(|data: &[u8]| {
    if let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = openapi_downgrade_core::convert(&document, &Default::default());
    }
});
