//! Ignore-pattern filtering.

use regex::Regex;
use tracing::warn;

use crate::route::Route;

/// Compiled ignore rules. A route is dropped when its path, or any of its query or
/// body field names, matches any rule.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    rules: Vec<Regex>,
}

impl IgnoreFilter {
    /// Compile the rules, skipping any that fail to parse.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let rules = patterns
            .iter()
            .filter_map(|p| match Regex::new(p.as_ref()) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!(pattern = p.as_ref(), error = %e, "skipping invalid ignore pattern");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_ignored(&self, route: &Route) -> bool {
        self.matches(&route.path)
            || route.query.iter().any(|q| self.matches(q))
            || route.body.iter().any(|b| self.matches(b))
    }

    fn matches(&self, text: &str) -> bool {
        self.rules.iter().any(|re| re.is_match(text))
    }
}

/// Drop every route ignored by at least one filter.
pub fn apply_filters(routes: Vec<Route>, filters: &[&IgnoreFilter]) -> Vec<Route> {
    if filters.iter().all(|f| f.is_empty()) {
        return routes;
    }
    routes
        .into_iter()
        .filter(|route| !filters.iter().any(|f| f.is_ignored(route)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::HttpMethod;

    fn routes() -> Vec<Route> {
        let mut search = Route::new("/search", HttpMethod::Get, "app.js", 3);
        search.query = vec!["debug_token".to_string()];
        let mut login = Route::new("/login", HttpMethod::Post, "app.js", 7);
        login.body = vec!["password".to_string()];
        vec![
            Route::new("/internal/health", HttpMethod::Get, "app.js", 1),
            search,
            login,
            Route::new("/users", HttpMethod::Get, "app.js", 9),
        ]
    }

    fn paths(routes: &[Route]) -> Vec<&str> {
        routes.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_path_query_and_body_are_checked() {
        let filter = IgnoreFilter::new(&["^/internal", "^debug_", "^password$"]);
        let kept = apply_filters(routes(), &[&filter]);
        assert_eq!(paths(&kept), vec!["/users"]);
    }

    #[test]
    fn test_invalid_rule_is_skipped_others_apply() {
        let filter = IgnoreFilter::new(&["([broken", "^/internal"]);
        let kept = apply_filters(routes(), &[&filter]);
        assert_eq!(paths(&kept), vec!["/search", "/login", "/users"]);
    }

    #[test]
    fn test_outcome_independent_of_rule_order() {
        let forward = IgnoreFilter::new(&["^/internal", "password", "([bad"]);
        let reverse = IgnoreFilter::new(&["([bad", "password", "^/internal"]);
        assert_eq!(
            apply_filters(routes(), &[&forward]),
            apply_filters(routes(), &[&reverse])
        );
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = IgnoreFilter::new::<&str>(&[]);
        assert_eq!(apply_filters(routes(), &[&filter]).len(), 4);
        assert_eq!(apply_filters(routes(), &[]).len(), 4);
    }
}
