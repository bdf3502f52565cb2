//! Read-only registry of loaded plugins.

use std::collections::BTreeMap;

use super::Plugin;

/// Immutable set of plugins keyed by lower-case name.
///
/// Iteration is in key order so that every run over the same plugin set visits
/// plugins in the same sequence.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Plugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from compiled plugins. A later plugin with the same key replaces an earlier one.
    pub fn from_plugins(plugins: impl IntoIterator<Item = Plugin>) -> Self {
        let plugins = plugins
            .into_iter()
            .map(|p| (p.key.clone(), p))
            .collect();
        Self { plugins }
    }

    /// Exact, case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugins declaring the given extension, in key order.
    pub fn for_extension<'a>(&'a self, ext: &'a str) -> impl Iterator<Item = &'a Plugin> + 'a {
        self.plugins.values().filter(move |p| p.handles_extension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PatternDefinition, PluginDefinition};

    fn plugin(key: &str, ext: &str) -> Plugin {
        Plugin::compile(
            key,
            PluginDefinition {
                name: key.to_string(),
                extensions: vec![ext.to_string()],
                patterns: vec![PatternDefinition {
                    method: "GET".to_string(),
                    route_regex: "(get)".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_exact() {
        let registry = PluginRegistry::from_plugins(vec![plugin("express", ".js")]);
        assert!(registry.get("EXPRESS").is_some());
        assert!(registry.get("expr").is_none());
        assert!(registry.get("express-v2").is_none());
    }

    #[test]
    fn test_later_plugin_replaces_same_key() {
        let registry = PluginRegistry::from_plugins(vec![plugin("gin", ".go"), plugin("GIN", ".gin")]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("gin").unwrap().handles_extension(".gin"));
    }

    #[test]
    fn test_for_extension_in_key_order() {
        let registry = PluginRegistry::from_plugins(vec![
            plugin("gin", ".go"),
            plugin("echo", ".go"),
            plugin("express", ".js"),
        ]);
        let keys: Vec<_> = registry.for_extension(".go").map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["echo", "gin"]);
    }
}
