//! Route data model.
//!
//! A [`Route`] is one (path template, HTTP method) pair discovered in source text,
//! together with inferred parameter names and where it was found.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Canonical HTTP verbs.
///
/// Ordering follows declaration order and is used when grouping routes by method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// All canonical verbs, in canonical order.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Verbs a catch-all declaration (`all`, `any`) expands into.
    pub const CATCH_ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Whether requests with this verb conventionally carry a body.
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// Expand a source verb token into canonical verbs.
    ///
    /// Case-insensitive. `all` and `any` expand into [`HttpMethod::CATCH_ALL`];
    /// anything that is not a verb yields an empty list.
    pub fn expand(token: &str) -> Vec<HttpMethod> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("any") {
            return Self::CATCH_ALL.to_vec();
        }
        token.parse().map(|m| vec![m]).unwrap_or_default()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a token is not a canonical HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAMethod(pub String);

impl fmt::Display for NotAMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an HTTP method", self.0)
    }
}

impl std::error::Error for NotAMethod {}

impl FromStr for HttpMethod {
    type Err = NotAMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| NotAMethod(s.to_string()))
    }
}

/// A discovered API route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Path template with the convention's placeholder syntax retained.
    pub path: String,
    pub method: HttpMethod,
    /// Path placeholder names, in order of appearance.
    #[serde(default)]
    pub params: Vec<String>,
    /// Inferred query field names.
    #[serde(default)]
    pub query: Vec<String>,
    /// Inferred body field names.
    #[serde(default)]
    pub body: Vec<String>,
    pub file: PathBuf,
    /// 1-based line of the declaration.
    pub line: usize,
}

impl Route {
    pub fn new(path: impl Into<String>, method: HttpMethod, file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            path: path.into(),
            method,
            params: Vec::new(),
            query: Vec::new(),
            body: Vec::new(),
            file: file.into(),
            line,
        }
    }

    /// Display name used by exporters: `GET /users`.
    pub fn name(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Prepend a mount prefix.
    ///
    /// A route at `/` becomes exactly the prefix; otherwise the two are joined with a
    /// single `/`.
    pub fn apply_base_path(&mut self, base: &str) {
        if self.path == "/" {
            self.path = base.to_string();
            return;
        }
        self.path = match (base.ends_with('/'), self.path.starts_with('/')) {
            (true, true) => format!("{}{}", base, &self.path[1..]),
            (false, false) => format!("{}/{}", base, self.path),
            _ => format!("{}{}", base, self.path),
        };
    }
}

/// Push `name` unless it is empty or already present. Keeps first-occurrence order.
pub(crate) fn push_unique(names: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if name.is_empty() || names.iter().any(|n| n == name) {
        return;
    }
    names.push(name.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!(" OPTIONS ".parse::<HttpMethod>().unwrap(), HttpMethod::Options);
        assert!("fetch".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_serializes_upper_case() {
        let json = serde_json::to_string(&HttpMethod::Patch).unwrap();
        assert_eq!(json, "\"PATCH\"");
    }

    #[test]
    fn test_expand_catch_all() {
        assert_eq!(HttpMethod::expand("all").len(), 5);
        assert_eq!(HttpMethod::expand("ANY").len(), 5);
        assert_eq!(HttpMethod::expand("put"), vec![HttpMethod::Put]);
        assert!(HttpMethod::expand("route").is_empty());
    }

    #[test]
    fn test_root_route_gets_exact_prefix() {
        let mut route = Route::new("/", HttpMethod::Get, "users.js", 1);
        route.apply_base_path("/users");
        assert_eq!(route.path, "/users");
    }

    #[test]
    fn test_base_path_joins_with_single_slash() {
        let mut a = Route::new("/:id", HttpMethod::Get, "users.js", 1);
        a.apply_base_path("/users");
        assert_eq!(a.path, "/users/:id");

        let mut b = Route::new(":id", HttpMethod::Get, "users.js", 1);
        b.apply_base_path("/users");
        assert_eq!(b.path, "/users/:id");

        let mut c = Route::new("/:id", HttpMethod::Get, "users.js", 1);
        c.apply_base_path("/users/");
        assert_eq!(c.path, "/users/:id");
    }

    #[test]
    fn test_push_unique_keeps_first_occurrence() {
        let mut names = Vec::new();
        push_unique(&mut names, "page");
        push_unique(&mut names, "limit");
        push_unique(&mut names, "page");
        push_unique(&mut names, "  ");
        assert_eq!(names, vec!["page", "limit"]);
    }
}
