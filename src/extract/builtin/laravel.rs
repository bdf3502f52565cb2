//! Laravel route files (`routes/web.php`, `routes/api.php`).
//!
//! Handles verb routes, `Route::match`, resource controllers, and prefixed groups opened
//! with `Route::prefix('x')->group(...)` or `Route::group(['prefix' => 'x'], ...)`.

use regex::Regex;
use std::sync::LazyLock;

use super::{brace_delta, placeholders};
use crate::extract::source::SourceFile;
use crate::route::{HttpMethod, Route};

static VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Route::(get|post|put|delete|patch|options|any)\s*\(\s*['"]([^'"]+)['"]"#).unwrap()
});

static MATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Route::match\s*\(\s*\[([^\]]*)\]\s*,\s*['"]([^'"]+)['"]"#).unwrap()
});

static RESOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Route::(resource|apiResource)\s*\(\s*['"]([^'"]+)['"]"#).unwrap()
});

static PREFIX_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Route::prefix\s*\(\s*['"]([^'"]*)['"]\s*\).*->group\s*\("#).unwrap()
});

static ARRAY_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Route::group\s*\(\s*\[[^\]]*['"]prefix['"]\s*=>\s*['"]([^'"]*)['"]"#).unwrap()
});

/// `{id}` and optional `{id?}`.
static PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\??\}").unwrap());

struct Group {
    prefix: String,
    /// Brace depth before the group opened.
    depth: isize,
}

pub(super) fn extract(source: &SourceFile) -> Vec<Route> {
    let mut routes = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut depth: isize = 0;

    for (line_no, line) in source.numbered_lines() {
        if is_comment(line) {
            continue;
        }

        let opened = PREFIX_GROUP
            .captures(line)
            .or_else(|| ARRAY_GROUP.captures(line))
            .map(|caps| caps[1].to_string());
        if let Some(prefix) = opened {
            groups.push(Group { prefix, depth });
        }

        let mut emit = |path: &str, methods: Vec<HttpMethod>| {
            let full = prefixed(&groups, path);
            let params = placeholders(&PARAM, &full);
            for method in methods {
                let mut route = Route::new(full.clone(), method, source.path.clone(), line_no);
                route.params = params.clone();
                routes.push(route);
            }
        };

        for caps in VERB.captures_iter(line) {
            emit(&caps[2], HttpMethod::expand(&caps[1]));
        }

        for caps in MATCH.captures_iter(line) {
            let mut methods = Vec::new();
            for token in caps[1].split(',') {
                for method in HttpMethod::expand(token.trim().trim_matches(|c| c == '\'' || c == '"')) {
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
            }
            emit(&caps[2], methods);
        }

        for caps in RESOURCE.captures_iter(line) {
            let api_only = &caps[1] == "apiResource";
            for (path, methods) in resource_routes(&caps[2], api_only) {
                emit(&path, methods);
            }
        }

        depth = (depth + brace_delta(line)).max(0);
        while groups.last().map_or(false, |g| depth <= g.depth) {
            groups.pop();
        }
    }

    routes
}

/// Routes registered by `Route::resource('photos', ...)`.
///
/// Dotted names nest: `photos.comments` gives `/photos/{photo}/comments/{comment}`.
fn resource_routes(name: &str, api_only: bool) -> Vec<(String, Vec<HttpMethod>)> {
    let segments: Vec<&str> = name.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Vec::new();
    };

    let mut base = String::new();
    for parent in parents {
        base.push_str(&format!("/{}/{{{}}}", parent, singular(parent)));
    }
    let collection = format!("{}/{}", base, last);
    let member = format!("{}/{{{}}}", collection, singular(last));

    let mut routes = vec![(collection.clone(), vec![HttpMethod::Get])];
    if !api_only {
        routes.push((format!("{}/create", collection), vec![HttpMethod::Get]));
    }
    routes.push((collection, vec![HttpMethod::Post]));
    routes.push((member.clone(), vec![HttpMethod::Get]));
    if !api_only {
        routes.push((format!("{}/edit", member), vec![HttpMethod::Get]));
    }
    routes.push((member.clone(), vec![HttpMethod::Put, HttpMethod::Patch]));
    routes.push((member, vec![HttpMethod::Delete]));
    routes
}

fn singular(word: &str) -> String {
    let word = word.replace('-', "_");
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if let Some(stem) = word.strip_suffix('s') {
        stem.to_string()
    } else {
        word
    }
}

fn prefixed(groups: &[Group], path: &str) -> String {
    let mut parts: Vec<&str> = groups
        .iter()
        .map(|g| g.prefix.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return path.to_string();
    }
    let tail = path.trim_matches('/');
    if !tail.is_empty() {
        parts.push(tail);
    }
    format!("/{}", parts.join("/"))
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with('*')
}
