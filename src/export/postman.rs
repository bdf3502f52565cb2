//! Postman Collection v2.1.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use super::{group_by_method, path_segments, ExportContext, Segment};
use crate::route::{HttpMethod, Route};

pub const SCHEMA: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub info: Info,
    pub item: Vec<Item>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    #[serde(rename = "_postman_id")]
    pub postman_id: String,
    pub name: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub name: String,
    pub request: Request,
    pub response: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub method: HttpMethod,
    pub header: Vec<Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    pub url: Url,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Body {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub formdata: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Url {
    pub raw: String,
    pub protocol: String,
    pub host: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    pub path: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<KeyValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<KeyValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    fn empty(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: String::new(),
        }
    }
}

/// Build a collection with one item per route, grouped by method.
pub fn collection(routes: &[Route], ctx: &ExportContext) -> Collection {
    let base = BaseUrl::parse(&ctx.base_url);
    let item = group_by_method(routes)
        .into_values()
        .flatten()
        .map(|route| item(route, &base))
        .collect();

    Collection {
        info: Info {
            postman_id: Uuid::new_v4().to_string(),
            name: ctx.collection_name(),
            description: format!(
                "Auto-generated API collection from {} - {} environment",
                ctx.project_path,
                ctx.environment.display_name()
            ),
            schema: SCHEMA.to_string(),
        },
        item,
    }
}

fn item(route: &Route, base: &BaseUrl) -> Item {
    let mut path = base.path.clone();
    let mut variable = Vec::new();
    for segment in path_segments(&route.path) {
        match segment {
            Segment::Literal(s) => path.push(s),
            Segment::Param(name) => {
                path.push(format!(":{}", name));
                variable.push(KeyValue::empty(&name));
            }
        }
    }

    let mut query = base.query.clone();
    query.extend(route.query.iter().map(|q| KeyValue::empty(q)));

    let mut raw = format!("{}/{}", base.origin(), path.join("/"));
    if !query.is_empty() {
        let pairs: Vec<String> = query.iter().map(|q| format!("{}={}", q.key, q.value)).collect();
        raw.push('?');
        raw.push_str(&pairs.join("&"));
    }

    let (body, header) = body(route);

    Item {
        name: route.name(),
        request: Request {
            method: route.method,
            header,
            body,
            url: Url {
                raw,
                protocol: base.protocol.clone(),
                host: vec![base.host.clone()],
                port: base.port.clone(),
                path,
                query,
                variable,
            },
            description: format!("Defined in {}:{}", route.file.display(), route.line),
        },
        response: Vec::new(),
    }
}

/// Form data when body fields are known, an empty JSON object otherwise.
fn body(route: &Route) -> (Option<Body>, Vec<Header>) {
    if !route.method.has_body() {
        return (None, Vec::new());
    }
    if route.body.is_empty() {
        let body = Body {
            mode: "raw".to_string(),
            raw: Some("{}".to_string()),
            formdata: Vec::new(),
        };
        let header = vec![Header {
            key: "Content-Type".to_string(),
            value: "application/json".to_string(),
        }];
        return (Some(body), header);
    }
    let formdata = route
        .body
        .iter()
        .map(|field| FormField {
            key: field.clone(),
            value: String::new(),
            kind: "text".to_string(),
        })
        .collect();
    let body = Body {
        mode: "formdata".to_string(),
        raw: None,
        formdata,
    };
    (Some(body), Vec::new())
}

/// A base URL split into the pieces Postman stores separately.
///
/// Credentials and fragments are dropped; a query string on the base is kept as leading
/// query parameters.
struct BaseUrl {
    protocol: String,
    host: String,
    port: Option<String>,
    path: Vec<String>,
    query: Vec<KeyValue>,
}

impl BaseUrl {
    fn parse(base_url: &str) -> Self {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| e.to_string())
            .and_then(|u| if u.has_host() { Ok(u) } else { Err("no host".to_string()) });
        match parsed {
            Ok(parsed) => Self::from_url(&parsed),
            Err(error) => {
                warn!(base_url, error = %error, "base URL does not parse, using it as the host");
                Self {
                    protocol: "http".to_string(),
                    host: base_url.trim_matches('/').to_string(),
                    port: None,
                    path: Vec::new(),
                    query: Vec::new(),
                }
            }
        }
    }

    fn from_url(parsed: &url::Url) -> Self {
        let path = parsed
            .path_segments()
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let query = parsed
            .query_pairs()
            .map(|(key, value)| KeyValue {
                key: key.into_owned(),
                value: value.into_owned(),
            })
            .collect();

        Self {
            protocol: parsed.scheme().to_string(),
            host: parsed.host_str().unwrap_or_default().to_string(),
            port: parsed.port().map(|p| p.to_string()),
            path,
            query,
        }
    }

    /// `scheme://host[:port]`.
    fn origin(&self) -> String {
        match &self.port {
            Some(port) => format!("{}://{}:{}", self.protocol, self.host, port),
            None => format!("{}://{}", self.protocol, self.host),
        }
    }
}
