//! Built-in extractors for well-known frameworks.
//!
//! Each one is a hand-written line scanner for its framework's routing idiom. They are
//! a closed set dispatched through [`BuiltinExtractor`].

mod django;
mod express;
mod flask;
mod laravel;
mod spring;

use regex::Regex;

use super::source::SourceFile;
use crate::route::{push_unique, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinExtractor {
    Express,
    Flask,
    Django,
    Spring,
    Laravel,
}

impl BuiltinExtractor {
    pub const ALL: [BuiltinExtractor; 5] = [
        BuiltinExtractor::Express,
        BuiltinExtractor::Flask,
        BuiltinExtractor::Django,
        BuiltinExtractor::Spring,
        BuiltinExtractor::Laravel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinExtractor::Express => "express",
            BuiltinExtractor::Flask => "flask",
            BuiltinExtractor::Django => "django",
            BuiltinExtractor::Spring => "spring",
            BuiltinExtractor::Laravel => "laravel",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            BuiltinExtractor::Express => &[".js", ".ts"],
            BuiltinExtractor::Flask | BuiltinExtractor::Django => &[".py"],
            BuiltinExtractor::Spring => &[".java"],
            BuiltinExtractor::Laravel => &[".php"],
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn handles_extension(&self, ext: &str) -> bool {
        self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Built-ins registered for an extension, in declaration order.
    pub fn for_extension(ext: &str) -> impl Iterator<Item = BuiltinExtractor> + '_ {
        Self::ALL.into_iter().filter(move |b| b.handles_extension(ext))
    }

    /// Extract raw routes. Query and body are left empty.
    pub fn extract(&self, source: &SourceFile) -> Vec<Route> {
        match self {
            BuiltinExtractor::Express => express::extract(source),
            BuiltinExtractor::Flask => flask::extract(source),
            BuiltinExtractor::Django => django::extract(source),
            BuiltinExtractor::Spring => spring::extract(source),
            BuiltinExtractor::Laravel => laravel::extract(source),
        }
    }
}

/// Group 1 of every match of `regex` in `path`, deduplicated.
fn placeholders(regex: &Regex, path: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in regex.captures_iter(path) {
        if let Some(name) = caps.get(1) {
            push_unique(&mut names, name.as_str());
        }
    }
    names
}

/// How far a decorator or annotation call may continue onto following lines.
const MAX_CALL_LINES: usize = 5;

/// The line at `idx`, joined with the lines after it until its parentheses balance.
fn balanced_call(lines: &[String], idx: usize) -> String {
    let mut text = String::new();
    let mut depth: isize = 0;
    for line in lines.iter().skip(idx).take(MAX_CALL_LINES) {
        text.push_str(line);
        text.push(' ');
        depth += line.matches('(').count() as isize - line.matches(')').count() as isize;
        if depth <= 0 {
            break;
        }
    }
    text
}

/// Net `{` minus `}` on a line.
fn brace_delta(line: &str) -> isize {
    line.matches('{').count() as isize - line.matches('}').count() as isize
}
