//! Flask decorators: `@app.route('/x', methods=[...])` and `@bp.get('/x')` shortcuts.

use regex::Regex;
use std::sync::LazyLock;

use super::{balanced_call, placeholders};
use crate::extract::source::SourceFile;
use crate::route::{HttpMethod, Route};

static ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*@\w+\.route\s*\(\s*['"]([^'"]+)['"]"#).unwrap());

static SHORTCUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*@\w+\.(get|post|put|delete|patch)\s*\(\s*['"]([^'"]+)['"]"#).unwrap()
});

static METHODS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"methods\s*=\s*[\[(]([^\])]*)[\])]").unwrap());

/// `<name>` and `<converter:name>`.
pub(super) static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:[^:<>]+:)?(\w+)>").unwrap());

pub(super) fn extract(source: &SourceFile) -> Vec<Route> {
    let mut routes = Vec::new();

    for (idx, line) in source.lines.iter().enumerate() {
        let line_no = idx + 1;

        if let Some(caps) = SHORTCUT.captures(line) {
            let path = &caps[2];
            for method in HttpMethod::expand(&caps[1]) {
                routes.push(route(source, path, method, line_no));
            }
            continue;
        }

        let Some(caps) = ROUTE.captures(line) else {
            continue;
        };
        let path = &caps[1];
        let decorator = balanced_call(&source.lines, idx);

        let methods = METHODS
            .captures(&decorator)
            .map(|m| parse_method_list(&m[1]))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec![HttpMethod::Get]);

        for method in methods {
            routes.push(route(source, path, method, line_no));
        }
    }

    routes
}

fn parse_method_list(list: &str) -> Vec<HttpMethod> {
    let mut methods = Vec::new();
    for token in list.split(',') {
        let token = token.trim().trim_matches(|c| c == '\'' || c == '"');
        for method in HttpMethod::expand(token) {
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
    }
    methods
}

fn route(source: &SourceFile, path: &str, method: HttpMethod, line: usize) -> Route {
    let mut route = Route::new(path, method, source.path.clone(), line);
    route.params = placeholders(&PARAM, path);
    route
}
