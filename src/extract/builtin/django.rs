//! Django URLconfs (`urls.py`): `path()`, `re_path()` and legacy `url()` entries.

use regex::Regex;
use std::sync::LazyLock;

use super::{flask, placeholders};
use crate::extract::source::SourceFile;
use crate::route::{push_unique, HttpMethod, Route};

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[^.\w])(?:path|re_path|url)\s*\(\s*r?['"]([^'"]*)['"]"#).unwrap()
});

/// Named groups in regex routes: `(?P<year>[0-9]{4})`.
static NAMED_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\?P<(\w+)>").unwrap());

const URLCONF: &str = "urls.py";

pub(super) fn extract(source: &SourceFile) -> Vec<Route> {
    if !source.file_name().to_ascii_lowercase().ends_with(URLCONF) {
        return Vec::new();
    }

    let mut routes = Vec::new();
    for (line_no, line) in source.numbered_lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            continue;
        }
        for caps in ENTRY.captures_iter(line) {
            // The empty pattern is the URLconf root.
            let path = if caps[1].is_empty() { "/" } else { &caps[1] };
            let mut route = Route::new(path, HttpMethod::Get, source.path.clone(), line_no);
            route.params = placeholders(&flask::PARAM, path);
            for name in placeholders(&NAMED_GROUP, path) {
                push_unique(&mut route.params, &name);
            }
            routes.push(route);
        }
    }
    routes
}
