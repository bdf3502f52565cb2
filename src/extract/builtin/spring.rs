//! Spring MVC controllers.
//!
//! A class-level `@RequestMapping` sets the base path; method-level `@GetMapping`-style
//! annotations (or `@RequestMapping(method = ...)`) declare routes under it.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use super::{balanced_call, placeholders};
use crate::extract::source::SourceFile;
use crate::route::{HttpMethod, Route};

static CLASS_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:class|interface)\s+\w+").unwrap());

static MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(Get|Post|Put|Delete|Patch|Request)Mapping\b(?:\s*\(([^)]*)\))?").unwrap()
});

/// A mapping whose argument list does not close on the same line.
static OPEN_MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:Get|Post|Put|Delete|Patch|Request)Mapping\s*\([^)]*$").unwrap()
});

static NAMED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(?:value|path)\s*=\s*(\{[^}]*\}|"[^"]*")"#).unwrap());

static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap());

static REQUEST_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RequestMethod\.(\w+)").unwrap());

/// `{id}` and regex-constrained `{id:\d+}`.
static PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)(?::[^}]*)?\}").unwrap());

pub(super) fn extract(source: &SourceFile) -> Vec<Route> {
    let (base, body_start) = class_base(&source.lines);

    let mut routes = Vec::new();
    for (idx, line) in source.lines.iter().enumerate().skip(body_start) {
        if is_comment(line) {
            continue;
        }
        let text = mapping_text(&source.lines, idx);
        for caps in MAPPING.captures_iter(&text) {
            // Continuation lines are scanned on their own turn.
            if caps.get(0).map_or(true, |m| m.start() >= line.len()) {
                continue;
            }
            let args = caps.get(2).map(|m| m.as_str());
            let methods = mapping_methods(&caps[1], args);

            let mut paths = mapping_paths(args);
            if paths.is_empty() {
                paths.push(String::new());
            }

            for path in paths {
                let full = join(&base, &path);
                let params = placeholders(&PARAM, &full);
                for method in &methods {
                    let mut route = Route::new(full.clone(), *method, source.path.clone(), idx + 1);
                    route.params = params.clone();
                    routes.push(route);
                }
            }
        }
    }
    routes
}

/// The class-level base path and the index of the first line after the class declaration.
fn class_base(lines: &[String]) -> (String, usize) {
    let mut base = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if is_comment(line) {
            continue;
        }
        let text = mapping_text(lines, idx);
        if let Some(caps) = MAPPING.captures(&text) {
            if &caps[1] == "Request" {
                if let Some(path) = mapping_paths(caps.get(2).map(|m| m.as_str())).into_iter().next() {
                    base = path;
                }
            }
        }
        if CLASS_DECL.is_match(line) {
            return (base.trim_end_matches('/').to_string(), idx + 1);
        }
    }
    (String::new(), 0)
}

/// The line at `idx`, extended over the following lines while a mapping's arguments are open.
fn mapping_text(lines: &[String], idx: usize) -> Cow<'_, str> {
    let line = &lines[idx];
    if OPEN_MAPPING.is_match(line) {
        Cow::Owned(balanced_call(lines, idx))
    } else {
        Cow::Borrowed(line.as_str())
    }
}

fn mapping_methods(kind: &str, args: Option<&str>) -> Vec<HttpMethod> {
    if kind != "Request" {
        return HttpMethod::expand(kind);
    }
    let mut methods = Vec::new();
    if let Some(args) = args {
        for caps in REQUEST_METHOD.captures_iter(args) {
            for method in HttpMethod::expand(&caps[1]) {
                if !methods.contains(&method) {
                    methods.push(method);
                }
            }
        }
    }
    if methods.is_empty() {
        methods.push(HttpMethod::Get);
    }
    methods
}

/// Paths declared in an annotation's arguments: `"/x"`, `{"/a", "/b"}`, `value = "/x"`,
/// `path = {...}`. Empty when the annotation names no path.
fn mapping_paths(args: Option<&str>) -> Vec<String> {
    let Some(args) = args.map(str::trim).filter(|a| !a.is_empty()) else {
        return Vec::new();
    };

    if let Some(caps) = NAMED_PATH.captures(args) {
        return literals(&caps[1]);
    }

    if args.starts_with('{') {
        let end = args.find('}').map_or(args.len(), |i| i + 1);
        return literals(&args[..end]);
    }

    if args.starts_with('"') {
        return literals(args).into_iter().take(1).collect();
    }

    Vec::new()
}

fn literals(text: &str) -> Vec<String> {
    STRING_LITERAL
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn join(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => path.to_string(),
        (false, true) => base.to_string(),
        (false, false) if path.starts_with('/') => format!("{}{}", base, path),
        (false, false) => format!("{}/{}", base, path),
    }
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTROLLER: &str = r#"package com.example.demo;

/**
 * Handles the user class of endpoints.
 */
@RestController
@RequestMapping("/api/users")
public class UserController {

    @GetMapping
    public ResponseEntity<?> getUsers(@RequestParam(required = false) Integer page) {
        return ResponseEntity.ok().build();
    }

    @GetMapping("/{id}")
    public ResponseEntity<?> getUser(@PathVariable Long id) {
        return ResponseEntity.ok().build();
    }

    @PostMapping(value = "/{id:\\d+}/posts", consumes = "application/json")
    public void createPost() {}

    @RequestMapping(value = {"/search", "find"}, method = {RequestMethod.GET, RequestMethod.POST})
    public void search() {}

    // @DeleteMapping("/{id}")
    @DeleteMapping("{id}")
    public void delete() {}
}
"#;

    #[test]
    fn test_controller_routes() {
        let source = SourceFile::from_source("UserController.java", CONTROLLER);
        let routes = extract(&source);
        let got: Vec<_> = routes.iter().map(|r| r.name()).collect();
        assert_eq!(
            got,
            vec![
                "GET /api/users",
                "GET /api/users/{id}",
                r"POST /api/users/{id:\\d+}/posts",
                "GET /api/users/search",
                "POST /api/users/search",
                "GET /api/users/find",
                "POST /api/users/find",
                "DELETE /api/users/{id}",
            ]
        );
        assert_eq!(routes[0].line, 10);
        assert_eq!(routes[2].params, vec!["id"]);
    }

    const WRAPPED: &str = r#"@RestController
@RequestMapping(
    "/api/reports")
public class ReportController {
    @GetMapping(
        value = "/daily",
        produces = "application/json")
    public Report daily() {}

    @RequestMapping(value = "/export",
                    method = RequestMethod.POST)
    public void export() {}
}
"#;

    #[test]
    fn test_annotation_arguments_across_lines() {
        let source = SourceFile::from_source("ReportController.java", WRAPPED);
        let routes = extract(&source);
        let got: Vec<_> = routes.iter().map(|r| (r.name(), r.line)).collect();
        assert_eq!(
            got,
            vec![
                ("GET /api/reports/daily".to_string(), 5),
                ("POST /api/reports/export".to_string(), 10),
            ]
        );
    }

    #[test]
    fn test_no_class_mapping() {
        let source = SourceFile::from_source(
            "Health.java",
            "@RestController\npublic class Health {\n  @GetMapping\n  public String ok() { return \"ok\"; }\n  @RequestMapping(\"/status\")\n  public String status() {}\n}\n",
        );
        let got: Vec<_> = extract(&source).iter().map(|r| r.name()).collect();
        assert_eq!(got, vec!["GET /", "GET /status"]);
    }
}
