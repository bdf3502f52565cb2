//! Generic matcher for plugin-declared route patterns.

use crate::plugin::Pattern;
use crate::route::{push_unique, HttpMethod, Route};

use super::source::SourceFile;

/// Apply one pattern to every line of a file.
///
/// Group 1 of `route_regex` is the verb token and group 2 the path; a match without a
/// path produces nothing. With a `|` alternation in the declared method, the verb token
/// must name one of its verbs or the match is dropped. When the line carries the multi-method marker and the pattern
/// has a `query_regex`, its verb list replaces the captured verb. A verb token that is not
/// an HTTP method falls back to the pattern's declared method when that is a single verb.
pub fn match_pattern(pattern: &Pattern, source: &SourceFile) -> Vec<Route> {
    let mut routes = Vec::new();

    for (line_no, line) in source.numbered_lines() {
        for caps in pattern.route_regex.captures_iter(line) {
            let Some(path) = caps.get(2).map(|m| m.as_str()) else {
                continue;
            };
            let token = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

            let mut methods = HttpMethod::expand(token);
            // An alternation gates the captured verb before any method list is read.
            if !pattern.alternatives.is_empty() && !methods.iter().any(|m| pattern.allows(*m)) {
                continue;
            }

            if let Some(list) = listed_methods(pattern, line) {
                methods = list;
            } else if methods.is_empty() && pattern.alternatives.is_empty() {
                methods = HttpMethod::expand(&pattern.method);
            }

            let params = placeholder_names(pattern, path);

            for method in methods.into_iter().filter(|m| pattern.allows(*m)) {
                let mut route = Route::new(path, method, source.path.clone(), line_no);
                route.params = params.clone();
                routes.push(route);
            }
        }
    }

    routes
}

/// Verbs from the pattern's list attribute, if the line has one.
fn listed_methods(pattern: &Pattern, line: &str) -> Option<Vec<HttpMethod>> {
    let regex = pattern.query_regex.as_ref()?;
    if !line.contains(&pattern.multi_method_marker) {
        return None;
    }
    let list = regex.captures(line)?.get(1)?.as_str();
    let mut methods = Vec::new();
    for token in list.split(',') {
        let token = token.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        for method in HttpMethod::expand(token) {
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
    }
    Some(methods)
}

fn placeholder_names(pattern: &Pattern, path: &str) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(regex) = &pattern.param_regex {
        for caps in regex.captures_iter(path) {
            if let Some(name) = caps.get(1) {
                push_unique(&mut names, name.as_str());
            }
        }
    }
    names
}
