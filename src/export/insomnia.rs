//! Insomnia export format v4.

use chrono::SecondsFormat;
use serde_json::{json, Value};

use super::ExportContext;
use crate::route::Route;

const WORKSPACE_ID: &str = "wrk_routemap_workspace";
const GROUP_ID: &str = "fld_routemap_group";
const ENVIRONMENT_ID: &str = "env_routemap_base";
const JAR_ID: &str = "jar_routemap";
const SPEC_ID: &str = "spc_routemap_spec";

/// Build the export document: workspace, one request group holding every request,
/// the base environment carrying `base_url`, a cookie jar and an empty API spec.
pub fn export(routes: &[Route], ctx: &ExportContext) -> Value {
    let base_time = ctx.generated_at.timestamp_millis();
    let tail = base_time + 100 * (routes.len() as i64 + 4);

    let mut resources = vec![
        json!({
            "_id": WORKSPACE_ID,
            "_type": "workspace",
            "parentId": null,
            "modified": base_time,
            "created": base_time,
            "name": ctx.collection_name(),
            "description": "",
            "scope": "collection",
        }),
        json!({
            "_id": GROUP_ID,
            "_type": "request_group",
            "parentId": WORKSPACE_ID,
            "modified": base_time + 100,
            "created": base_time + 100,
            "name": format!("{} API", ctx.project_name),
            "description": "Auto-generated API collection",
            "environment": {},
            "environmentPropertyOrder": null,
            "metaSortKey": -(base_time + 100),
        }),
    ];

    for (i, route) in routes.iter().enumerate() {
        let timestamp = base_time + 200 + 100 * i as i64;
        resources.push(request(route, i + 1, timestamp));
    }

    resources.push(json!({
        "_id": ENVIRONMENT_ID,
        "_type": "environment",
        "parentId": WORKSPACE_ID,
        "modified": tail,
        "created": tail,
        "name": "Base Environment",
        "data": { "base_url": ctx.base_url },
        "dataPropertyOrder": null,
        "color": null,
        "isPrivate": false,
        "metaSortKey": tail,
    }));
    resources.push(json!({
        "_id": JAR_ID,
        "_type": "cookie_jar",
        "parentId": WORKSPACE_ID,
        "modified": tail + 100,
        "created": tail + 100,
        "name": "Default Jar",
        "cookies": [],
    }));
    resources.push(json!({
        "_id": SPEC_ID,
        "_type": "api_spec",
        "parentId": WORKSPACE_ID,
        "modified": tail + 200,
        "created": tail + 200,
        "fileName": ctx.collection_name(),
        "contents": "",
        "contentType": "yaml",
    }));

    json!({
        "_type": "export",
        "__export_format": 4,
        "__export_date": ctx.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        "__export_source": concat!("routemap:", env!("CARGO_PKG_VERSION")),
        "resources": resources,
    })
}

fn request(route: &Route, seq: usize, timestamp: i64) -> Value {
    let body = if !route.method.has_body() {
        json!({})
    } else if route.body.is_empty() {
        json!({ "mimeType": "application/json", "text": "{}" })
    } else {
        let params: Vec<Value> = route
            .body
            .iter()
            .map(|field| json!({ "name": field, "value": "" }))
            .collect();
        json!({ "mimeType": "application/x-www-form-urlencoded", "params": params })
    };

    let parameters: Vec<Value> = route
        .query
        .iter()
        .map(|q| json!({ "name": q, "value": "" }))
        .collect();

    json!({
        "_id": format!("req_{}_{}", sanitize_id(&route.path), seq),
        "_type": "request",
        "parentId": GROUP_ID,
        "modified": timestamp,
        "created": timestamp,
        "url": format!("{{{{ base_url }}}}{}", route.path),
        "name": route.name(),
        "description": format!("Defined in {}:{}", route.file.display(), route.line),
        "method": route.method,
        "body": body,
        "parameters": parameters,
        "headers": [],
        "authentication": {},
        "metaSortKey": -timestamp,
        "isPrivate": false,
        "settingStoreCookies": true,
        "settingSendCookies": true,
        "settingDisableRenderRequestBody": false,
        "settingEncodeUrl": true,
        "settingRebuildPath": true,
        "settingFollowRedirects": "global",
    })
}

/// Lower-case, `/` and `-` become `_`, placeholder delimiters dropped.
fn sanitize_id(path: &str) -> String {
    path.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '/' | '-' => Some('_'),
            ':' | '{' | '}' | '<' | '>' | '?' => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Environment;
    use crate::route::HttpMethod;
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn ctx() -> ExportContext {
        let mut ctx = ExportContext::new(Path::new("/srv/shop"), Environment::Staging, "https://s.example.com");
        ctx.generated_at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        ctx
    }

    #[test]
    fn test_export_layout() {
        let mut create = Route::new("/users/{id}", HttpMethod::Post, "routes/api.php", 3);
        create.body = vec!["name".to_string()];
        let mut list = Route::new("/users", HttpMethod::Get, "routes/api.php", 2);
        list.query = vec!["page".to_string()];

        let doc = export(&[list, create], &ctx());
        assert_eq!(doc["__export_format"], 4);
        assert_eq!(doc["__export_date"], "2025-01-02T03:04:05.000Z");

        let resources = doc["resources"].as_array().unwrap();
        let types: Vec<_> = resources.iter().map(|r| r["_type"].as_str().unwrap()).collect();
        assert_eq!(
            types,
            vec!["workspace", "request_group", "request", "request", "environment", "cookie_jar", "api_spec"]
        );

        assert_eq!(resources[0]["name"], "shop API (Staging)");
        assert_eq!(resources[2]["url"], "{{ base_url }}/users");
        assert_eq!(resources[2]["parameters"][0]["name"], "page");
        assert_eq!(resources[3]["_id"], "req__users_id_2");
        assert_eq!(resources[3]["body"]["mimeType"], "application/x-www-form-urlencoded");
        assert_eq!(resources[4]["data"]["base_url"], "https://s.example.com");
    }
}
