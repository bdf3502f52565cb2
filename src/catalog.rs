//! Source file discovery.

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, RouteMapError};
use crate::plugin::{normalize_extension, PluginRegistry};

/// Extensions scanned even when no plugin is loaded.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".js", ".ts", ".py", ".java", ".php", ".go"];

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "vendor",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "build",
    "dist",
    ".idea",
    ".vscode",
];

/// Default extensions plus every extension declared by a loaded plugin.
pub fn scanned_extensions(registry: &PluginRegistry) -> Vec<String> {
    let mut exts: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
    for plugin in registry.iter() {
        for ext in &plugin.extensions {
            if !exts.contains(ext) {
                exts.push(ext.clone());
            }
        }
    }
    exts
}

/// Collect candidate source files under `root`.
///
/// Hidden entries and `.gitignore`d paths are skipped, as is anything under
/// [`SKIP_DIRS`]. Shallower files come first, then lexical order, so entry
/// files are seen before the modules they mount.
pub fn discover_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(RouteMapError::io(
            root,
            "scan",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let wanted: Vec<String> = extensions.iter().map(|e| normalize_extension(e)).collect();

    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
            let skipped = entry
                .file_name()
                .to_str()
                .map_or(false, |name| SKIP_DIRS.contains(&name));
            !(is_dir && entry.depth() > 0 && skipped)
        })
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map_or(false, |ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, &wanted))
        .collect();

    files.sort_by(|a, b| {
        a.components()
            .count()
            .cmp(&b.components().count())
            .then_with(|| a.cmp(b))
    });

    debug!(root = %root.display(), count = files.len(), "discovered source files");
    Ok(files)
}

fn has_extension(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = normalize_extension(&ext.to_string_lossy());
            wanted.contains(&ext)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn defaults() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_skips_dependency_dirs_and_unknown_extensions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("node_modules/lib")).unwrap();
        fs::create_dir_all(root.join("routes")).unwrap();
        fs::write(root.join("node_modules/lib/index.js"), "").unwrap();
        fs::write(root.join("app.js"), "").unwrap();
        fs::write(root.join("routes/users.js"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let files = discover_files(root, &defaults()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["app.js", "routes/users.js"]);
    }

    #[test]
    fn test_plugin_extension_is_scanned() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("routes.rb"), "").unwrap();

        assert!(discover_files(dir.path(), &defaults()).unwrap().is_empty());

        let mut exts = defaults();
        exts.push("rb".to_string());
        assert_eq!(discover_files(dir.path(), &exts).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_files(&dir.path().join("nope"), &defaults()).is_err());
    }
}
