//! Framework plugins: user-supplied convention definitions.
//!
//! A plugin is loaded from YAML ([`definition`]), validated and compiled into a
//! [`Plugin`], and stored in a read-only [`PluginRegistry`] that is handed to the
//! extraction engine.

pub mod definition;
pub mod loader;
pub mod registry;

use regex::Regex;

use crate::error::{Result, RouteMapError};
use crate::route::HttpMethod;
pub use definition::{PatternDefinition, PluginDefinition, RouterMountDefinition};
pub use loader::{load_plugins, plugin_search_dirs, LoadedPlugins};
pub use registry::PluginRegistry;

/// Default multi-method marker: the substring a line must contain before a
/// pattern's `query_regex` is consulted.
pub const DEFAULT_MULTI_METHOD_MARKER: &str = "methods";

/// A validated plugin with compiled patterns.
#[derive(Debug, Clone)]
pub struct Plugin {
    /// Registry key (lower-case).
    pub key: String,
    pub name: String,
    pub description: String,
    /// Lower-case file suffixes with a leading dot.
    pub extensions: Vec<String>,
    pub patterns: Vec<Pattern>,
    pub router_mount: Option<RouterMountSpec>,
    /// Raw ignore regexes. Compiled at filter time so one bad entry only drops itself.
    pub ignore: Vec<String>,
}

impl Plugin {
    /// Validate and compile a definition.
    ///
    /// Fails if `extensions` or `patterns` is empty, or if any route, param, query, or
    /// router-mount regex does not compile.
    pub fn compile(key: &str, def: PluginDefinition) -> Result<Self> {
        let key = key.to_lowercase();
        if def.extensions.is_empty() {
            return Err(RouteMapError::InvalidPlugin {
                plugin: key,
                message: "no extensions defined".to_string(),
            });
        }
        if def.patterns.is_empty() {
            return Err(RouteMapError::InvalidPlugin {
                plugin: key,
                message: "no patterns defined".to_string(),
            });
        }

        let patterns = def
            .patterns
            .into_iter()
            .map(|p| Pattern::compile(&key, p))
            .collect::<Result<Vec<_>>>()?;

        let router_mount = match def.router_mount {
            Some(mount) if mount.is_declared() => Some(RouterMountSpec::compile(&key, &mount)?),
            _ => None,
        };

        let name = if def.name.is_empty() { key.clone() } else { def.name };

        Ok(Self {
            key,
            name,
            description: def.description,
            extensions: def.extensions.iter().map(|e| normalize_extension(e)).collect(),
            patterns,
            router_mount,
            ignore: def.ignore,
        })
    }

    /// Whether this plugin applies to files with the given extension.
    pub fn handles_extension(&self, ext: &str) -> bool {
        let ext = normalize_extension(ext);
        self.extensions.iter().any(|e| *e == ext)
    }
}

/// A compiled route pattern rule.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The declared method string, e.g. `GET` or `GET|POST`.
    pub method: String,
    /// Declared alternatives when `method` uses `|`; empty otherwise.
    pub alternatives: Vec<String>,
    pub route_regex: Regex,
    pub param_regex: Option<Regex>,
    pub query_regex: Option<Regex>,
    pub multi_method_marker: String,
}

impl Pattern {
    fn compile(plugin: &str, def: PatternDefinition) -> Result<Self> {
        let alternatives = if def.method.contains('|') {
            def.method
                .split('|')
                .map(|m| m.trim().to_ascii_uppercase())
                .filter(|m| !m.is_empty())
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            alternatives,
            route_regex: compile_regex(plugin, &def.route_regex)?,
            param_regex: def
                .param_regex
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| compile_regex(plugin, p))
                .transpose()?,
            query_regex: def
                .query_regex
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| compile_regex(plugin, p))
                .transpose()?,
            multi_method_marker: def
                .multi_method_marker
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MULTI_METHOD_MARKER.to_string()),
            method: def.method,
        })
    }

    /// Whether a captured verb is allowed by the declared alternation.
    pub fn allows(&self, method: HttpMethod) -> bool {
        self.alternatives.is_empty()
            || self
                .alternatives
                .iter()
                .any(|alt| alt.eq_ignore_ascii_case(method.as_str()))
    }
}

/// The coupled regex triple used to resolve router mounts.
#[derive(Debug, Clone)]
pub struct RouterMountSpec {
    /// Captures (prefix, variable).
    pub use_pattern: Regex,
    /// Captures the module reference path.
    pub require_pattern: Regex,
    /// Captures the variable bound to the reference.
    pub var_pattern: Regex,
}

impl RouterMountSpec {
    fn compile(plugin: &str, def: &RouterMountDefinition) -> Result<Self> {
        Ok(Self {
            use_pattern: compile_regex(plugin, &def.use_pattern)?,
            require_pattern: compile_regex(plugin, &def.require_pattern)?,
            var_pattern: compile_regex(plugin, &def.var_pattern)?,
        })
    }
}

fn compile_regex(plugin: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| RouteMapError::InvalidPattern {
        plugin: plugin.to_string(),
        pattern: pattern.to_string(),
        source: e,
    })
}

/// Lower-case an extension and make sure it has a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(method: &str, route_regex: &str) -> PatternDefinition {
        PatternDefinition {
            method: method.to_string(),
            route_regex: route_regex.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_compile_normalizes_extensions_and_key() {
        let def = PluginDefinition {
            name: "Gin".to_string(),
            extensions: vec!["go".to_string(), ".GO".to_string()],
            patterns: vec![pattern("GET", r#"\.(GET)\("([^"]+)""#)],
            ..Default::default()
        };
        let plugin = Plugin::compile("Gin", def).unwrap();
        assert_eq!(plugin.key, "gin");
        assert_eq!(plugin.extensions, vec![".go", ".go"]);
        assert!(plugin.handles_extension("go"));
        assert!(plugin.handles_extension(".Go"));
        assert!(!plugin.handles_extension(".js"));
    }

    #[test]
    fn test_compile_rejects_missing_extensions() {
        let def = PluginDefinition {
            patterns: vec![pattern("GET", "(get)")],
            ..Default::default()
        };
        let err = Plugin::compile("broken", def).unwrap_err();
        assert!(matches!(err, RouteMapError::InvalidPlugin { .. }));
    }

    #[test]
    fn test_compile_rejects_missing_patterns() {
        let def = PluginDefinition {
            extensions: vec![".js".to_string()],
            ..Default::default()
        };
        assert!(Plugin::compile("broken", def).is_err());
    }

    #[test]
    fn test_compile_rejects_bad_route_regex() {
        let def = PluginDefinition {
            extensions: vec![".js".to_string()],
            patterns: vec![pattern("GET", "([unclosed")],
            ..Default::default()
        };
        let err = Plugin::compile("broken", def).unwrap_err();
        assert!(matches!(err, RouteMapError::InvalidPattern { .. }));
    }

    #[test]
    fn test_ignore_regexes_not_validated_at_compile() {
        let def = PluginDefinition {
            extensions: vec![".js".to_string()],
            patterns: vec![pattern("GET", "(get)")],
            ignore: vec!["([bad".to_string()],
            ..Default::default()
        };
        let plugin = Plugin::compile("lenient", def).unwrap();
        assert_eq!(plugin.ignore.len(), 1);
    }

    #[test]
    fn test_undeclared_router_mount_is_dropped() {
        let def = PluginDefinition {
            extensions: vec![".js".to_string()],
            patterns: vec![pattern("GET", "(get)")],
            router_mount: Some(RouterMountDefinition::default()),
            ..Default::default()
        };
        let plugin = Plugin::compile("nomount", def).unwrap();
        assert!(plugin.router_mount.is_none());
    }

    #[test]
    fn test_pattern_alternation() {
        let p = Pattern::compile("t", pattern("GET|POST", "(x)")).unwrap();
        assert!(p.allows(HttpMethod::Get));
        assert!(p.allows(HttpMethod::Post));
        assert!(!p.allows(HttpMethod::Delete));

        let single = Pattern::compile("t", pattern("GET", "(x)")).unwrap();
        assert!(single.allows(HttpMethod::Delete));
        assert_eq!(single.multi_method_marker, DEFAULT_MULTI_METHOD_MARKER);
    }
}
