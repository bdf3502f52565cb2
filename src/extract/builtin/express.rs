//! Express / Express-style routers (`app.get('/x', ...)`, `router.route('/x').get(...)`).

use regex::Regex;
use std::sync::LazyLock;

use super::{brace_delta, placeholders};
use crate::extract::source::SourceFile;
use crate::route::{HttpMethod, Route};

static ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:app|router|express|\w+Router)\.(get|post|put|delete|patch|head|options|all)\s*\(\s*['"`]([^'"`]+)['"`]"#,
    )
    .unwrap()
});

static CHAIN_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:app|router|\w+Router)\.route\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#).unwrap()
});

static CHAINED_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^\s*|\)\s*)\.(get|post|put|delete|patch|head|options|all)\s*\(").unwrap()
});

static PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":(\w+)").unwrap());

/// An open `.route('/x')` chain.
struct Chain {
    path: String,
    depth: isize,
}

pub(super) fn extract(source: &SourceFile) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut chain: Option<Chain> = None;

    for (line_no, line) in source.numbered_lines() {
        let mut declared = false;
        for caps in ROUTE.captures_iter(line) {
            push_routes(&mut routes, source, line_no, &caps[1], &caps[2]);
            declared = true;
        }

        let mut verbs_from = 0;
        if let Some(start) = CHAIN_START.captures(line) {
            verbs_from = start.get(0).map_or(0, |m| m.end());
            chain = Some(Chain {
                path: start[1].to_string(),
                depth: 0,
            });
        } else if declared || chain.as_ref().map_or(false, |c| c.depth == 0 && ends_chain(line)) {
            chain = None;
        }

        if let Some(open) = chain.as_mut() {
            let rest = line.get(verbs_from..).unwrap_or_default();
            for caps in CHAINED_VERB.captures_iter(rest) {
                // Only verbs at the chain's own level; calls inside a handler body are not routes.
                let at = caps.get(0).map_or(0, |m| m.start());
                if open.depth + brace_delta(&rest[..at]) != 0 {
                    continue;
                }
                let path = open.path.clone();
                push_routes(&mut routes, source, line_no, &caps[1], &path);
            }

            open.depth = (open.depth + brace_delta(line)).max(0);
            if open.depth == 0 && line.trim_end().ends_with(';') {
                chain = None;
            }
        }
    }

    routes
}

/// A statement at the chain's level that is not a `.verb(...)` continuation.
fn ends_chain(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('.') && !trimmed.starts_with("//")
}

fn push_routes(routes: &mut Vec<Route>, source: &SourceFile, line: usize, verb: &str, path: &str) {
    let params = placeholders(&PARAM, path);
    for method in HttpMethod::expand(verb) {
        let mut route = Route::new(path, method, source.path.clone(), line);
        route.params = params.clone();
        routes.push(route);
    }
}
