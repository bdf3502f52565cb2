//! Heuristic query/body parameter inference.
//!
//! Starting at a route's declaration line, the scanner walks forward through a bounded
//! window looking for request accessors (`req.query.page`, `request.args.get('q')`,
//! `$request->input('name')`, ...). It tracks whether it has entered the handler body and
//! how deep it is in braces so it can stop when the handler closes, and it stops early
//! when it reaches the next route declaration.
//!
//! This is proximity-based text matching. Parameters read through helpers or passed
//! around indirectly are missed, and a nested callback can be attributed to its parent.

use regex::Regex;
use std::sync::LazyLock;

use crate::route::{push_unique, HttpMethod};

/// Maximum number of lines examined per route, declaration line included.
pub const SCAN_WINDOW: usize = 30;

/// Lines after the declaration scanned even before a handler marker is seen.
pub const GRACE_LINES: usize = 3;

/// Source language family, which decides the accessor vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    JavaScript,
    Python,
    Php,
    Java,
    Go,
}

impl Convention {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" => Some(Convention::JavaScript),
            "py" => Some(Convention::Python),
            "php" => Some(Convention::Php),
            "java" | "kt" => Some(Convention::Java),
            "go" => Some(Convention::Go),
            _ => None,
        }
    }

    fn accessors(&self) -> &'static AccessorSet {
        match self {
            Convention::JavaScript => &JAVASCRIPT,
            Convention::Python => &PYTHON,
            Convention::Php => &PHP,
            Convention::Java => &JAVA,
            Convention::Go => &GO,
        }
    }
}

/// Inferred field names, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamUsage {
    pub query: Vec<String>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Query,
    Body,
    /// Query for verbs without a body, body otherwise.
    ByMethod,
}

#[derive(Debug, Clone, Copy)]
enum Capture {
    /// The first participating group is one field name.
    Single,
    /// Group 1 is a comma-separated list (`{ a, b = 1 }`, `['a', 'b']`).
    List,
}

struct Accessor {
    regex: Regex,
    target: Target,
    capture: Capture,
}

impl Accessor {
    fn new(pattern: &str, target: Target, capture: Capture) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            target,
            capture,
        }
    }
}

struct AccessorSet {
    /// A line matching any of these opens the handler body.
    handler_markers: Vec<Regex>,
    /// A route declaration that ends the current route's window.
    next_route: Regex,
    accessors: Vec<Accessor>,
}

impl AccessorSet {
    fn collect(&self, text: &str, method: HttpMethod, usage: &mut ParamUsage) {
        for accessor in &self.accessors {
            let target = match accessor.target {
                Target::Query => &mut usage.query,
                Target::Body => &mut usage.body,
                Target::ByMethod if method.has_body() => &mut usage.body,
                Target::ByMethod => &mut usage.query,
            };
            for caps in accessor.regex.captures_iter(text) {
                match accessor.capture {
                    Capture::Single => {
                        if let Some(name) = caps.iter().skip(1).flatten().next() {
                            push_unique(target, name.as_str());
                        }
                    }
                    Capture::List => {
                        if let Some(list) = caps.get(1) {
                            for name in split_destructured(list.as_str()) {
                                push_unique(target, &name);
                            }
                        }
                    }
                }
            }
        }
    }
}

static JAVASCRIPT: LazyLock<AccessorSet> = LazyLock::new(|| AccessorSet {
    handler_markers: vec![
        Regex::new(r"=>").unwrap(),
        Regex::new(r"\bfunction\b[^(]*\(\s*(?:req|request|ctx)\b").unwrap(),
    ],
    next_route: Regex::new(
        r"(?:\b(?:app|router|express|\w+Router)\.(?:get|post|put|delete|patch|head|options|all|route)|^\s*\.(?:get|post|put|delete|patch|head|options|all))\s*\(",
    )
    .unwrap(),
    accessors: vec![
        Accessor::new(
            r"\{([^}]*)\}\s*=\s*(?:req|request|ctx\.request|ctx)\.query\b",
            Target::Query,
            Capture::List,
        ),
        Accessor::new(
            r"\{([^}]*)\}\s*=\s*(?:req|request|ctx\.request)\.body\b",
            Target::Body,
            Capture::List,
        ),
        Accessor::new(
            r#"\b(?:req|request|ctx\.request|ctx)\.query(?:\.(\w+)|\[\s*['"](\w+)['"]\s*\])"#,
            Target::Query,
            Capture::Single,
        ),
        Accessor::new(
            r#"\b(?:req|request|ctx\.request)\.body(?:\.(\w+)|\[\s*['"](\w+)['"]\s*\])"#,
            Target::Body,
            Capture::Single,
        ),
    ],
});

static PYTHON: LazyLock<AccessorSet> = LazyLock::new(|| AccessorSet {
    handler_markers: vec![Regex::new(r"^\s*(?:async\s+)?def\s+\w+\s*\(").unwrap()],
    next_route: Regex::new(
        r"^\s*@\w+(?:\.\w+)*\.(?:route|get|post|put|delete|patch)\s*\(|(?:^|[^.\w])(?:re_path|path|url)\s*\(",
    )
    .unwrap(),
    accessors: vec![
        Accessor::new(
            r#"\brequest\.(?:args|GET|query_params)(?:\.get\(\s*|\[\s*)['"](\w+)['"]"#,
            Target::Query,
            Capture::Single,
        ),
        Accessor::new(
            r#"\brequest\.(?:form|json|POST|data|files|get_json\(\))(?:\.get\(\s*|\[\s*)['"](\w+)['"]"#,
            Target::Body,
            Capture::Single,
        ),
    ],
});

static PHP: LazyLock<AccessorSet> = LazyLock::new(|| AccessorSet {
    handler_markers: vec![
        Regex::new(r"\bfunction\s*\w*\s*\(").unwrap(),
        Regex::new(r"\bfn\s*\(").unwrap(),
    ],
    next_route: Regex::new(r"\bRoute::\w+\s*\(").unwrap(),
    accessors: vec![
        Accessor::new(
            r#"\$request->query\(\s*['"](\w+)['"]"#,
            Target::Query,
            Capture::Single,
        ),
        Accessor::new(
            r#"\$request->(?:post|json|file)\(\s*['"](\w+)['"]"#,
            Target::Body,
            Capture::Single,
        ),
        Accessor::new(
            r#"(?:\$request->(?:input|get)|\brequest|\bInput::get)\(\s*['"](\w+)['"]"#,
            Target::ByMethod,
            Capture::Single,
        ),
        Accessor::new(
            r"\$request->only\(\s*\[([^\]]*)\]",
            Target::ByMethod,
            Capture::List,
        ),
    ],
});

static JAVA: LazyLock<AccessorSet> = LazyLock::new(|| AccessorSet {
    handler_markers: vec![Regex::new(r"\b(?:public|protected|private)\s+[^=;]*\w+\s*\(").unwrap()],
    next_route: Regex::new(r"@(?:Get|Post|Put|Delete|Patch|Request)Mapping\b").unwrap(),
    accessors: vec![
        Accessor::new(
            r"@RequestParam\b(?:\s*\([^)]*\))?\s+(?:final\s+)?[\w.]+(?:<[^>]*>)?(?:\[\])?\s+(\w+)",
            Target::Query,
            Capture::Single,
        ),
        Accessor::new(
            r"@RequestPart\b(?:\s*\([^)]*\))?\s+(?:final\s+)?[\w.]+(?:<[^>]*>)?(?:\[\])?\s+(\w+)",
            Target::Body,
            Capture::Single,
        ),
    ],
});

static GO: LazyLock<AccessorSet> = LazyLock::new(|| AccessorSet {
    handler_markers: vec![
        Regex::new(r"\bfunc\s*\(\s*\w+\s+\*?\w+(?:\.\w+)?\s*[,)]").unwrap(),
        Regex::new(r"\bfunc\s+\w+\s*\(\s*\w+\s+\*?\w+\.(?:Context|ResponseWriter)\b").unwrap(),
    ],
    next_route: Regex::new(r"\.(?:GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS|Any|Handle|HandleFunc)\s*\(")
        .unwrap(),
    accessors: vec![
        Accessor::new(
            r#"\.(?:Query|DefaultQuery|GetQuery|QueryArray|QueryParam)\(\s*"(\w+)""#,
            Target::Query,
            Capture::Single,
        ),
        Accessor::new(
            r#"\.URL\.Query\(\)\.Get\(\s*"(\w+)""#,
            Target::Query,
            Capture::Single,
        ),
        Accessor::new(
            r#"\.(?:PostForm|DefaultPostForm|GetPostForm|PostFormArray|FormValue|FormFile)\(\s*"(\w+)""#,
            Target::Body,
            Capture::Single,
        ),
    ],
});

/// Infer the query and body fields used by the handler declared at `line` (1-based).
pub fn scan_params(
    lines: &[String],
    line: usize,
    method: HttpMethod,
    convention: Convention,
) -> ParamUsage {
    let mut usage = ParamUsage::default();
    if line == 0 || line > lines.len() {
        return usage;
    }

    let set = convention.accessors();
    let start = line - 1;
    let end = (start + SCAN_WINDOW).min(lines.len());

    let mut inside = false;
    let mut depth: usize = 0;

    for (offset, text) in lines[start..end].iter().enumerate() {
        if offset > 0 && set.next_route.is_match(text) {
            break;
        }

        if set.handler_markers.iter().any(|m| m.is_match(text)) {
            inside = true;
            depth = 0;
        }

        let opens = text.matches('{').count();
        let closes = text.matches('}').count();
        depth = (depth + opens).saturating_sub(closes);

        if inside || offset <= GRACE_LINES {
            set.collect(text, method, &mut usage);
        }

        if inside && closes > 0 && depth == 0 && (text.contains(')') || text.contains(',')) {
            break;
        }
    }

    usage
}

/// Split a destructuring capture into field names.
///
/// `page = 1, limit` gives `["page", "limit"]`; `id: userId` keeps the source key `id`;
/// quotes are stripped so PHP arrays (`'name', 'email'`) work too. Rest elements are
/// dropped.
pub fn split_destructured(capture: &str) -> Vec<String> {
    let mut names = Vec::new();
    for part in capture.split(',') {
        let part = part.split('=').next().unwrap_or_default();
        let part = part.split(':').next().unwrap_or_default();
        let name = part.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        if name.starts_with("...") || !is_identifier(name) {
            continue;
        }
        push_unique(&mut names, name);
    }
    names
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
