//! Route collection exporters.
//!
//! Every exporter is a pure function of the routes and an [`ExportContext`]; nothing here
//! touches the filesystem.

pub mod curl;
pub mod httpie;
pub mod insomnia;
pub mod postman;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, RouteMapError};
use crate::route::{HttpMethod, Route};

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Postman,
    Insomnia,
    Httpie,
    Curl,
    Markdown,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Postman => "postman",
            ExportFormat::Insomnia => "insomnia",
            ExportFormat::Httpie => "httpie",
            ExportFormat::Curl => "curl",
            ExportFormat::Markdown => "markdown",
        }
    }

    /// Product name for user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Postman => "Postman",
            ExportFormat::Insomnia => "Insomnia",
            ExportFormat::Httpie => "HTTPie",
            ExportFormat::Curl => "CURL",
            ExportFormat::Markdown => "Markdown",
        }
    }

    pub fn default_file_stem(&self) -> &'static str {
        match self {
            ExportFormat::Postman => "postman-collection",
            ExportFormat::Insomnia => "insomnia-export",
            ExportFormat::Httpie => "httpie-collection",
            ExportFormat::Curl => "api-requests",
            ExportFormat::Markdown => "api-requests",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Postman | ExportFormat::Insomnia | ExportFormat::Httpie => "json",
            ExportFormat::Curl => "sh",
            ExportFormat::Markdown => "md",
        }
    }

    /// Whether the output is a shell script that should be executable.
    pub fn is_script(&self) -> bool {
        matches!(self, ExportFormat::Curl)
    }

    /// Output file name. `stem` overrides the default stem (its extension is dropped);
    /// `env` is appended when exporting several environments.
    pub fn file_name(&self, stem: Option<&str>, env: Option<Environment>) -> String {
        let stem = stem
            .map(|s| {
                Path::new(s)
                    .file_stem()
                    .map(|f| f.to_string_lossy().to_string())
                    .unwrap_or_else(|| s.to_string())
            })
            .unwrap_or_else(|| self.default_file_stem().to_string());
        match env {
            Some(env) => format!("{}-{}.{}", stem, env, self.extension()),
            None => format!("{}.{}", stem, self.extension()),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RouteMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postman" => Ok(ExportFormat::Postman),
            "insomnia" => Ok(ExportFormat::Insomnia),
            "httpie" => Ok(ExportFormat::Httpie),
            "curl" => Ok(ExportFormat::Curl),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(RouteMapError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Staging, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Environment::Dev => "Development",
            Environment::Staging => "Staging",
            Environment::Prod => "Production",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Dev => "http://localhost:3000",
            Environment::Staging => "https://staging-api.example.com",
            Environment::Prod => "https://api.example.com",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs shared by every exporter.
#[derive(Debug, Clone)]
pub struct ExportContext {
    /// Last component of the project root.
    pub project_name: String,
    pub project_path: String,
    pub environment: Environment,
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub generated_at: DateTime<Utc>,
}

impl ExportContext {
    pub fn new(project_root: &Path, environment: Environment, base_url: impl Into<String>) -> Self {
        let project_name = project_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string());
        Self {
            project_name,
            project_path: project_root.display().to_string(),
            environment,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            generated_at: Utc::now(),
        }
    }

    /// `myapp API (Development)`.
    pub fn collection_name(&self) -> String {
        format!("{} API ({})", self.project_name, self.environment.display_name())
    }
}

/// Render routes in the given format.
pub fn render(format: ExportFormat, routes: &[Route], ctx: &ExportContext) -> Result<String> {
    let document = match format {
        ExportFormat::Postman => serde_json::to_string_pretty(&postman::collection(routes, ctx))?,
        ExportFormat::Insomnia => serde_json::to_string_pretty(&insomnia::export(routes, ctx))?,
        ExportFormat::Httpie => serde_json::to_string_pretty(&httpie::collection(routes, ctx))?,
        ExportFormat::Curl => curl::script(routes, ctx),
        ExportFormat::Markdown => curl::markdown(routes, ctx),
    };
    Ok(document)
}

/// One `/`-separated piece of a route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Split a route path into segments, recognising `:name`, `<name>`, `<conv:name>`,
/// `{name}`, `{name?}` and `{name:regex}` placeholders.
pub fn path_segments(path: &str) -> Vec<Segment> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match placeholder_name(s) {
            Some(name) => Segment::Param(name),
            None => Segment::Literal(s.to_string()),
        })
        .collect()
}

fn placeholder_name(segment: &str) -> Option<String> {
    let name = if let Some(rest) = segment.strip_prefix(':') {
        rest.trim_end_matches('?')
    } else if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        inner.rsplit(':').next().unwrap_or(inner)
    } else if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        inner.split(':').next().unwrap_or(inner).trim_end_matches('?')
    } else {
        return None;
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Routes grouped by method, in canonical verb order, keeping input order within a group.
pub fn group_by_method(routes: &[Route]) -> BTreeMap<HttpMethod, Vec<&Route>> {
    let mut groups: BTreeMap<HttpMethod, Vec<&Route>> = BTreeMap::new();
    for route in routes {
        groups.entry(route.method).or_default().push(route);
    }
    groups
}
