//! Plugin discovery and loading.
//!
//! Plugins live in `plugins/` directories as `*.yml` / `*.yaml` files. A broken file
//! is reported and skipped; it never stops the remaining plugins from loading.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Plugin, PluginDefinition, PluginRegistry};
use crate::error::{Result, RouteMapError};

/// How many ancestors of the executable's directory are searched for `plugins/`.
const MAX_EXECUTABLE_DEPTH: usize = 5;

const PLUGINS_DIR: &str = "plugins";

/// Outcome of loading plugins from a set of directories.
#[derive(Debug, Default)]
pub struct LoadedPlugins {
    pub registry: PluginRegistry,
    /// Directories that contributed at least one plugin.
    pub loaded_dirs: Vec<PathBuf>,
    /// Files that were skipped, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Directories to search for plugins, in priority order (later ones override earlier).
///
/// Order: explicit directories, `<project>/plugins`, the first `plugins/` found walking up
/// from the executable, `<cwd>/plugins`. Only existing directories are returned and each
/// one appears once.
pub fn plugin_search_dirs(
    explicit: &[PathBuf],
    project_root: Option<&Path>,
    executable: Option<&Path>,
) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut push = |dir: PathBuf| {
        if !dir.is_dir() {
            return;
        }
        let dir = dir.canonicalize().unwrap_or(dir);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    };

    for dir in explicit {
        push(dir.clone());
    }

    if let Some(root) = project_root {
        push(root.join(PLUGINS_DIR));
    }

    if let Some(exe) = executable {
        let exe = exe.canonicalize().unwrap_or_else(|_| exe.to_path_buf());
        let mut current = exe.parent();
        let mut depth = 0;
        while let Some(dir) = current {
            if depth >= MAX_EXECUTABLE_DEPTH {
                break;
            }
            let candidate = dir.join(PLUGINS_DIR);
            if candidate.is_dir() {
                push(candidate);
                break;
            }
            current = dir.parent();
            depth += 1;
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        push(cwd.join(PLUGINS_DIR));
    }

    dirs
}

/// Load every plugin file from the given directories into a registry.
pub fn load_plugins(dirs: &[PathBuf]) -> LoadedPlugins {
    let mut plugins: Vec<Plugin> = Vec::new();
    let mut loaded = LoadedPlugins::default();

    for dir in dirs {
        match load_plugins_from_dir(dir) {
            Ok((found, skipped)) => {
                if !found.is_empty() {
                    info!(dir = %dir.display(), count = found.len(), "loaded plugins");
                    loaded.loaded_dirs.push(dir.clone());
                }
                plugins.extend(found);
                loaded.skipped.extend(skipped);
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "could not read plugin directory");
            }
        }
    }

    loaded.registry = PluginRegistry::from_plugins(plugins);
    loaded
}

/// Load all plugin files from one directory, returning the plugins and the skipped files.
fn load_plugins_from_dir(dir: &Path) -> Result<(Vec<Plugin>, Vec<(PathBuf, String)>)> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| RouteMapError::io(dir, "read directory", e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_plugin_file(path))
        .collect();
    entries.sort();

    let mut plugins = Vec::new();
    let mut skipped = Vec::new();

    for path in entries {
        match load_plugin_file(&path) {
            Ok(plugin) => {
                debug!(plugin = %plugin.key, file = %path.display(), "plugin loaded");
                plugins.push(plugin);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "skipping plugin");
                skipped.push((path, e.to_string()));
            }
        }
    }

    Ok((plugins, skipped))
}

/// Read, parse and compile a single plugin file.
pub fn load_plugin_file(path: &Path) -> Result<Plugin> {
    let content = fs::read_to_string(path).map_err(|e| RouteMapError::io(path, "read", e))?;
    let def: PluginDefinition =
        serde_yaml::from_str(&content).map_err(|e| RouteMapError::PluginParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    let key = plugin_key(path, &def);
    Plugin::compile(&key, def)
}

/// The registry key for a plugin file.
///
/// The file stem wins so `express-v2.yaml` is keyed `express-v2`; a generic
/// `plugin.yaml` falls back to the `name` field.
fn plugin_key(path: &Path, def: &PluginDefinition) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if stem == "plugin" && !def.name.is_empty() {
        def.name.to_lowercase()
    } else {
        stem
    }
}

fn is_plugin_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "yml" || ext == "yaml"
        })
        .unwrap_or(false)
}
