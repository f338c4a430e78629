//! Pass 5: Security schemes
//!
//! Maps OpenAPI 3 security schemes onto Swagger 2.0 security definitions:
//! HTTP basic → `basic`, HTTP bearer → an `Authorization` header `apiKey`, and
//! OAuth2 → its first flow only. Everything else passes through.

use serde_json::{json, Map, Value};

use crate::resolver::build_path;
use crate::warning::WarningKind;

use super::Context;

/// Convert `components.securitySchemes` in place.
pub fn convert_security_schemes(schemes: &mut Map<String, Value>, ctx: &mut Context<'_>) {
    for (name, scheme) in schemes.iter_mut() {
        let path = build_path("#/components/securitySchemes", &[name.as_str()]);
        let Some(scheme) = scheme.as_object_mut() else {
            continue;
        };

        let scheme_type = scheme
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        match scheme_type.as_deref() {
            Some("http") => convert_http(scheme, path, ctx),
            Some("oauth2") => convert_oauth2(scheme),
            Some("openIdConnect") => ctx.warn(
                path,
                WarningKind::UnsupportedSecurityScheme {
                    scheme_type: "openIdConnect".to_string(),
                },
                format!("Security scheme {name} (openIdConnect) has no Swagger 2.0 equivalent."),
            ),
            _ => {}
        }
    }
}

fn convert_http(scheme: &mut Map<String, Value>, path: String, ctx: &mut Context<'_>) {
    let http_scheme = scheme
        .get("scheme")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();

    match http_scheme.as_str() {
        "basic" => {
            scheme.insert("type".to_string(), json!("basic"));
            scheme.shift_remove("scheme");
        }
        "bearer" => {
            scheme.insert("type".to_string(), json!("apiKey"));
            scheme.insert("name".to_string(), json!("Authorization"));
            scheme.insert("in".to_string(), json!("header"));
            scheme.shift_remove("scheme");
            scheme.shift_remove("bearerFormat");
        }
        other => ctx.warn(
            path,
            WarningKind::UnsupportedSecurityScheme {
                scheme_type: format!("http/{other}"),
            },
            format!("HTTP auth scheme '{other}' has no Swagger 2.0 equivalent."),
        ),
    }
}

fn convert_oauth2(scheme: &mut Map<String, Value>) {
    let Some(Value::Object(flows)) = scheme.shift_remove("flows") else {
        return;
    };
    // Only the first flow survives.
    let Some((flow_name, flow)) = flows.into_iter().next() else {
        return;
    };

    scheme.insert("flow".to_string(), json!(oauth2_flow_name(&flow_name)));
    for key in ["authorizationUrl", "tokenUrl", "scopes"] {
        if let Some(value) = flow.get(key) {
            scheme.insert(key.to_string(), value.clone());
        }
    }
}

fn oauth2_flow_name(flow_name: &str) -> &str {
    match flow_name {
        "clientCredentials" => "application",
        "authorizationCode" => "accessCode",
        other => other,
    }
}
