//! HTTPie Desktop collection.

use serde::Serialize;

use super::{path_segments, ExportContext, Segment};
use crate::route::{HttpMethod, Route};

pub const SCHEMA: &str = "https://schema.httpie.io/1.0.0.json";
const DOCS: &str = "https://httpie.io/r/help/export-from-httpie";

#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub meta: Meta,
    pub entry: Entry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub format: String,
    pub version: String,
    pub content_type: String,
    pub schema: String,
    pub docs: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub name: String,
    pub icon: Icon,
    pub auth: Auth,
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Icon {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Auth {
    #[serde(rename = "type")]
    pub kind: String,
}

impl Auth {
    fn new(kind: &str) -> Self {
        Self { kind: kind.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<Param>,
    pub query_params: Vec<Param>,
    pub path_params: Vec<Param>,
    pub auth: Auth,
    pub body: Body,
}

#[derive(Debug, Clone, Serialize)]
pub struct Param {
    pub name: String,
    pub value: String,
    pub enabled: bool,
}

impl Param {
    fn enabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: String::new(),
            enabled: true,
        }
    }
}

/// Every body slot is always present; `type` selects which one HTTPie uses.
#[derive(Debug, Clone, Serialize)]
pub struct Body {
    #[serde(rename = "type")]
    pub kind: String,
    pub file: FileBody,
    pub text: TextBody,
    pub form: FormBody,
    pub graphql: GraphqlBody,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileBody {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub value: String,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBody {
    pub is_multipart: bool,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphqlBody {
    pub query: String,
    pub variables: String,
}

pub fn collection(routes: &[Route], ctx: &ExportContext) -> Collection {
    Collection {
        meta: Meta {
            format: "httpie".to_string(),
            version: "1.0.0".to_string(),
            content_type: "collection".to_string(),
            schema: SCHEMA.to_string(),
            docs: DOCS.to_string(),
            source: format!("routemap {}", env!("CARGO_PKG_VERSION")),
        },
        entry: Entry {
            name: ctx.collection_name(),
            icon: Icon {
                name: "default".to_string(),
                color: "gray".to_string(),
            },
            auth: Auth::new("none"),
            requests: routes.iter().map(|route| request(route, ctx)).collect(),
        },
    }
}

fn request(route: &Route, ctx: &ExportContext) -> Request {
    Request {
        name: route.name(),
        url: templated_url(&ctx.base_url, &route.path),
        method: route.method,
        headers: Vec::new(),
        query_params: route.query.iter().map(|q| Param::enabled(q)).collect(),
        path_params: route.params.iter().map(|p| Param::enabled(p)).collect(),
        auth: Auth::new("inherited"),
        body: body(route),
    }
}

/// Path placeholders in any framework's syntax become `{{name}}`.
fn templated_url(base_url: &str, path: &str) -> String {
    let segments: Vec<String> = path_segments(path)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(s) => s,
            Segment::Param(name) => format!("{{{{{}}}}}", name),
        })
        .collect();
    format!("{}/{}", base_url, segments.join("/"))
}

fn body(route: &Route) -> Body {
    let mut body = Body {
        kind: "none".to_string(),
        file: FileBody::default(),
        text: TextBody {
            value: String::new(),
            format: "application/json".to_string(),
        },
        form: FormBody::default(),
        graphql: GraphqlBody::default(),
    };

    if route.method.has_body() {
        if route.body.is_empty() {
            body.kind = "text".to_string();
            body.text.value = "{}".to_string();
        } else {
            body.kind = "form".to_string();
            body.form.fields = route
                .body
                .iter()
                .map(|field| FormField {
                    name: field.clone(),
                    value: String::new(),
                })
                .collect();
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Environment;
    use std::path::Path;

    fn ctx() -> ExportContext {
        ExportContext::new(Path::new("/srv/blog"), Environment::Prod, "https://api.example.com")
    }

    #[test]
    fn test_request_url_and_params() {
        let mut route = Route::new("/posts/:post_id/comments/{id}", HttpMethod::Get, "app.js", 9);
        route.params = vec!["post_id".to_string(), "id".to_string()];
        route.query = vec!["sort".to_string()];

        let collection = collection(&[route], &ctx());
        let request = &collection.entry.requests[0];
        assert_eq!(collection.entry.name, "blog API (Production)");
        assert_eq!(request.url, "https://api.example.com/posts/{{post_id}}/comments/{{id}}");
        assert_eq!(request.path_params.len(), 2);
        assert_eq!(request.query_params[0].name, "sort");
        assert!(request.query_params[0].enabled);
        assert_eq!(request.body.kind, "none");
    }

    #[test]
    fn test_body_kinds() {
        let mut form = Route::new("/login", HttpMethod::Post, "app.py", 1);
        form.body = vec!["username".to_string(), "password".to_string()];
        let text = Route::new("/items/<id>", HttpMethod::Patch, "app.py", 2);

        let collection = collection(&[form, text], &ctx());
        let form = &collection.entry.requests[0].body;
        assert_eq!(form.kind, "form");
        assert_eq!(form.form.fields[1].name, "password");

        let text = &collection.entry.requests[1].body;
        assert_eq!(text.kind, "text");
        assert_eq!(text.text.value, "{}");
    }

    #[test]
    fn test_serialized_field_names() {
        let route = Route::new("/health", HttpMethod::Get, "main.go", 3);
        let json = serde_json::to_value(collection(&[route], &ctx())).unwrap();
        assert_eq!(json["meta"]["contentType"], "collection");
        assert_eq!(json["meta"]["schema"], SCHEMA);
        assert_eq!(json["entry"]["auth"]["type"], "none");
        assert_eq!(json["entry"]["requests"][0]["auth"]["type"], "inherited");
        assert_eq!(json["entry"]["requests"][0]["body"]["form"]["isMultipart"], false);
        assert!(json["entry"]["requests"][0]["queryParams"].as_array().unwrap().is_empty());
    }
}
