//! YAML schema for plugin definition files.
//!
//! ```yaml
//! name: gin
//! description: Gin web framework (Go)
//! extensions: [".go"]
//! patterns:
//!   - method: "GET|POST|PUT|DELETE|PATCH"
//!     route_regex: '\.(GET|POST|PUT|DELETE|PATCH)\s*\(\s*"([^"]+)"'
//!     param_regex: ':(\w+)'
//! ignore:
//!   - '^/debug'
//! ```

use serde::{Deserialize, Serialize};

/// One plugin file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
    #[serde(default)]
    pub router_mount: Option<RouterMountDefinition>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// A route pattern rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// A single verb or `|`-joined alternatives.
    #[serde(default)]
    pub method: String,
    /// Group 1 is the method token, group 2 the path template.
    pub route_regex: String,
    #[serde(default)]
    pub param_regex: Option<String>,
    /// Group 1 is a comma-separated verb list (e.g. `methods=['GET', 'POST']`).
    #[serde(default)]
    pub query_regex: Option<String>,
    /// Substring that must appear on the line before `query_regex` is tried.
    #[serde(default)]
    pub multi_method_marker: Option<String>,
}

/// Router mounting patterns (Express-style `app.use('/prefix', router)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterMountDefinition {
    #[serde(default)]
    pub use_pattern: String,
    #[serde(default)]
    pub require_pattern: String,
    #[serde(default)]
    pub var_pattern: String,
}

impl RouterMountDefinition {
    /// A mount section is only meaningful when the use pattern is set.
    pub fn is_declared(&self) -> bool {
        !self.use_pattern.trim().is_empty()
    }
}
