//! Pass 0: Top-level metadata
//!
//! Folds the first `servers` entry into Swagger 2.0's `host`, `basePath` and
//! `schemes`. Additional servers are discarded. `servers` and `openapi` are
//! always removed.

use serde_json::{json, Map, Value};
use url::Url;

use crate::warning::WarningKind;

use super::Context;

pub fn convert_servers(root: &mut Map<String, Value>, ctx: &mut Context<'_>) {
    let servers = root.shift_remove("servers");
    root.shift_remove("openapi");

    let Some(server) = servers.as_ref().and_then(|s| s.get(0)) else {
        return;
    };
    let Some(template) = server.get("url").and_then(Value::as_str) else {
        return;
    };

    let server_url = substitute_variables(template, server.get("variables"));

    match Url::parse(&server_url) {
        Ok(parsed) => {
            if let Some(host) = parsed.host_str() {
                let host = match parsed.port() {
                    Some(port) => format!("{host}:{port}"),
                    None => host.to_string(),
                };
                root.insert("host".to_string(), Value::String(host));
            }
            root.insert("schemes".to_string(), json!([parsed.scheme()]));
            insert_base_path(root, parsed.path());
        }
        // Relative server URLs only carry a path.
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = server_url.split(['?', '#']).next().unwrap_or_default();
            if path.starts_with('/') {
                insert_base_path(root, path);
            } else if !path.is_empty() {
                insert_base_path(root, &format!("/{path}"));
            }
        }
        Err(err) => ctx.warn(
            "#/servers/0/url".to_string(),
            WarningKind::InvalidServerUrl {
                url: server_url.clone(),
            },
            format!("Unable to parse server URL {server_url}: {err}"),
        ),
    }
}

/// Replace every `{name}` with the variable's declared default.
///
/// Variables without a (non-empty string) default are left in place.
pub fn substitute_variables(template: &str, variables: Option<&Value>) -> String {
    let mut url = template.to_string();
    let Some(Value::Object(variables)) = variables else {
        return url;
    };

    for (name, variable) in variables {
        let default = variable.get("default").and_then(Value::as_str);
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            url = url.replace(&format!("{{{name}}}"), default);
        }
    }
    url
}

// "/" means no base path at all.
fn insert_base_path(root: &mut Map<String, Value>, path: &str) {
    if path != "/" {
        root.insert("basePath".to_string(), Value::String(path.to_string()));
    }
}
