//! Route extraction engine.
//!
//! [`RouteExtractor`] owns the plugin registry and the framework selector. For each file
//! it picks an extraction strategy, infers query/body parameters, applies router-mount
//! prefixes and finally the ignore rules:
//!
//! 1. A pinned framework with a built-in extractor for the file's extension uses that
//!    extractor alone.
//! 2. Otherwise every plugin in scope for the extension runs its patterns.
//! 3. If that finds nothing, the built-ins for the extension accepted by the selector run.

pub mod builtin;
pub mod filter;
pub mod mount;
pub mod params;
pub mod pattern;
pub mod source;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{Result, RouteMapError};
use crate::plugin::{Plugin, PluginRegistry, RouterMountSpec};
use crate::route::Route;
pub use builtin::BuiltinExtractor;
pub use filter::IgnoreFilter;
pub use mount::{BasePathMap, MountResolver};
pub use params::{scan_params, Convention, ParamUsage};
pub use source::SourceFile;

/// Which conventions to apply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameworkSelector {
    /// Every plugin and built-in for the file's extension.
    #[default]
    Auto,
    /// One plugin or built-in, stored lower-case.
    Named(String),
}

impl FrameworkSelector {
    /// Whether the named plugin or built-in may run under this selector.
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            FrameworkSelector::Auto => true,
            FrameworkSelector::Named(pinned) => pinned.eq_ignore_ascii_case(name),
        }
    }
}

impl FromStr for FrameworkSelector {
    type Err = RouteMapError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(RouteMapError::EmptyFramework);
        }
        if name.eq_ignore_ascii_case("auto") {
            Ok(FrameworkSelector::Auto)
        } else {
            Ok(FrameworkSelector::Named(name.to_lowercase()))
        }
    }
}

impl fmt::Display for FrameworkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameworkSelector::Auto => f.write_str("auto"),
            FrameworkSelector::Named(name) => f.write_str(name),
        }
    }
}

/// Extracts routes from source files with a fixed plugin set and selector.
pub struct RouteExtractor {
    framework: FrameworkSelector,
    registry: PluginRegistry,
    /// Compiled ignore rules per plugin key.
    ignore_filters: BTreeMap<String, IgnoreFilter>,
    base_paths: BasePathMap,
}

impl RouteExtractor {
    /// Create an extractor.
    ///
    /// Fails if a pinned framework names neither a loaded plugin nor a built-in.
    pub fn new(framework: FrameworkSelector, registry: PluginRegistry) -> Result<Self> {
        if let FrameworkSelector::Named(name) = &framework {
            if !registry.contains(name) && BuiltinExtractor::from_name(name).is_none() {
                return Err(RouteMapError::UnknownFramework {
                    name: name.clone(),
                    available: available_frameworks(&registry).join(", "),
                });
            }
        }

        let ignore_filters = registry
            .iter()
            .filter(|p| !p.ignore.is_empty())
            .map(|p| (p.key.clone(), IgnoreFilter::new(p.ignore.as_slice())))
            .collect();

        Ok(Self {
            framework,
            registry,
            ignore_filters,
            base_paths: BasePathMap::new(),
        })
    }

    /// Mount prefixes found by the last [`build_router_map`](Self::build_router_map).
    pub fn base_paths(&self) -> &BasePathMap {
        &self.base_paths
    }

    /// Resolve router mounts across `files`. Must run before extraction for prefixes
    /// to apply; replaces any earlier map.
    pub fn build_router_map(&mut self, files: &[PathBuf]) {
        self.base_paths = match self.mount_spec() {
            Some((spec, extensions)) => MountResolver::new(spec, extensions).resolve(files),
            None => BasePathMap::new(),
        };
    }

    /// Build the router map, then extract every file in order.
    pub fn extract_all(&mut self, files: &[PathBuf]) -> Vec<Route> {
        self.build_router_map(files);
        let routes: Vec<Route> = files.iter().flat_map(|f| self.extract_file(f)).collect();
        info!(files = files.len(), routes = routes.len(), "extraction finished");
        routes
    }

    /// Extract one file. An unreadable file yields no routes.
    pub fn extract_file(&self, path: &Path) -> Vec<Route> {
        match SourceFile::read(path) {
            Ok(source) => self.extract_source(&source),
            Err(e) => {
                debug!(file = %path.display(), error = %e, "skipping unreadable file");
                Vec::new()
            }
        }
    }

    /// Full pipeline for an in-memory file: strategy, parameter scan, prefix, ignore.
    pub fn extract_source(&self, source: &SourceFile) -> Vec<Route> {
        let ext = source.extension();
        let mut routes = self.raw_routes(source, &ext);

        if let Some(convention) = Convention::from_extension(&ext) {
            for route in &mut routes {
                let usage = scan_params(&source.lines, route.line, route.method, convention);
                route.query = usage.query;
                route.body = usage.body;
            }
        }

        if let Some(base) = self.base_paths.get(&source.path) {
            for route in &mut routes {
                route.apply_base_path(base);
            }
        }

        let filters: Vec<&IgnoreFilter> = self
            .plugins_in_scope(&ext)
            .filter_map(|p| self.ignore_filters.get(&p.key))
            .collect();
        let routes = filter::apply_filters(routes, &filters);

        if !routes.is_empty() {
            debug!(file = %source.path.display(), routes = routes.len(), "extracted routes");
        }
        routes
    }

    /// Routes before parameter inference, prefixing and filtering.
    fn raw_routes(&self, source: &SourceFile, ext: &str) -> Vec<Route> {
        if let FrameworkSelector::Named(name) = &self.framework {
            if let Some(builtin) = BuiltinExtractor::from_name(name).filter(|b| b.handles_extension(ext)) {
                return builtin.extract(source);
            }
        }

        let mut routes = Vec::new();
        for plugin in self.plugins_in_scope(ext) {
            for pattern in &plugin.patterns {
                routes.extend(pattern::match_pattern(pattern, source));
            }
        }

        if routes.is_empty() {
            for builtin in BuiltinExtractor::for_extension(ext) {
                if self.framework.accepts(builtin.name()) {
                    routes.extend(builtin.extract(source));
                }
            }
        }

        routes
    }

    /// Plugins that apply to files with `ext` under the current selector.
    fn plugins_in_scope<'a>(&'a self, ext: &'a str) -> Box<dyn Iterator<Item = &'a Plugin> + 'a> {
        match &self.framework {
            FrameworkSelector::Auto => Box::new(self.registry.for_extension(ext)),
            FrameworkSelector::Named(name) => Box::new(
                self.registry
                    .get(name)
                    .filter(|p| p.handles_extension(ext))
                    .into_iter(),
            ),
        }
    }

    /// The mount spec to resolve with, and the extensions it applies to.
    fn mount_spec(&self) -> Option<(&RouterMountSpec, Vec<String>)> {
        let from_plugin = match &self.framework {
            FrameworkSelector::Auto => self.registry.iter().find(|p| p.router_mount.is_some()),
            FrameworkSelector::Named(name) => {
                self.registry.get(name).filter(|p| p.router_mount.is_some())
            }
        };

        if let Some(plugin) = from_plugin {
            if let Some(spec) = &plugin.router_mount {
                debug!(plugin = %plugin.key, "using plugin router mounts");
                return Some((spec, plugin.extensions.clone()));
            }
        }

        if self.framework.accepts(BuiltinExtractor::Express.name()) {
            let extensions = mount::EXPRESS_MOUNT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect();
            return Some((&*mount::EXPRESS_MOUNT, extensions));
        }

        None
    }
}

/// Plugin keys followed by built-in names not shadowed by a plugin.
pub fn available_frameworks(registry: &PluginRegistry) -> Vec<String> {
    let mut names: Vec<String> = registry.names().into_iter().map(str::to_string).collect();
    for builtin in BuiltinExtractor::ALL {
        if !registry.contains(builtin.name()) {
            names.push(builtin.name().to_string());
        }
    }
    names
}
