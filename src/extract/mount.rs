//! Router-mount base-path resolution.
//!
//! Entry files commonly bind a module to a variable and mount it under a prefix:
//!
//! ```js
//! const usersRouter = require('./routes/users');
//! app.use('/users', usersRouter);
//! ```
//!
//! Routes declared inside `routes/users.js` are then reachable under `/users`. The
//! resolver reads every candidate file, pairs bindings with mounts, and records the
//! prefix for each mounted file. Only direct mounts are followed.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::source::SourceFile;
use crate::plugin::RouterMountSpec;

/// Mount triple used for Express projects when no plugin declares one.
pub static EXPRESS_MOUNT: LazyLock<RouterMountSpec> = LazyLock::new(|| RouterMountSpec {
    use_pattern: Regex::new(r#"app\.use\s*\(\s*['"]([^'"]+)['"]\s*,\s*(\w+)"#).unwrap(),
    require_pattern: Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap(),
    var_pattern: Regex::new(r"(?:const|let|var)\s+(\w+)\s*=.*require").unwrap(),
});

/// Extensions the built-in Express triple applies to.
pub const EXPRESS_MOUNT_EXTENSIONS: &[&str] = &[".js", ".ts"];

/// Mounted file → prefix.
///
/// Keys are absolute, lexically cleaned, use forward slashes and are compared
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePathMap {
    entries: HashMap<String, String>,
}

impl BasePathMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prefix for `path`, replacing any earlier one.
    pub fn insert(&mut self, path: &Path, prefix: impl Into<String>) {
        self.entries.insert(path_key(path), prefix.into());
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(&path_key(path)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolves router mounts with one [`RouterMountSpec`].
pub struct MountResolver<'a> {
    spec: &'a RouterMountSpec,
    /// Extensions the mount rules apply to; also the lookup order for extension-less references.
    extensions: Vec<String>,
}

impl<'a> MountResolver<'a> {
    pub fn new(spec: &'a RouterMountSpec, extensions: Vec<String>) -> Self {
        Self { spec, extensions }
    }

    /// Build the base-path map from all applicable files.
    ///
    /// Files are processed in the given order, so when two entry files mount the same
    /// module the later mount wins.
    pub fn resolve(&self, files: &[PathBuf]) -> BasePathMap {
        let mut map = BasePathMap::new();
        for file in files.iter().filter(|f| self.applies_to(f)) {
            match SourceFile::read(file) {
                Ok(source) => self.resolve_file(&source, &mut map),
                Err(e) => debug!(file = %file.display(), error = %e, "skipping unreadable file"),
            }
        }
        debug!(mounts = map.len(), "resolved router mounts");
        map
    }

    /// Binding pass then mount pass over one file.
    pub fn resolve_file(&self, source: &SourceFile, map: &mut BasePathMap) {
        let mut bindings: HashMap<String, PathBuf> = HashMap::new();

        for line in &source.lines {
            let reference = self
                .spec
                .require_pattern
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str());
            let variable = self
                .spec
                .var_pattern
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str());
            if let (Some(reference), Some(variable)) = (reference, variable) {
                let target = self.resolve_reference(&source.path, reference);
                bindings.insert(variable.to_string(), target);
            }
        }

        if bindings.is_empty() {
            return;
        }

        for line in &source.lines {
            for caps in self.spec.use_pattern.captures_iter(line) {
                let (Some(prefix), Some(variable)) = (caps.get(1), caps.get(2)) else {
                    continue;
                };
                if let Some(target) = bindings.get(variable.as_str()) {
                    debug!(
                        file = %target.display(),
                        prefix = prefix.as_str(),
                        from = %source.path.display(),
                        "router mounted"
                    );
                    map.insert(target, prefix.as_str());
                }
            }
        }
    }

    fn applies_to(&self, file: &Path) -> bool {
        file.extension()
            .map(|ext| {
                let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
                self.extensions.contains(&ext)
            })
            .unwrap_or(false)
    }

    /// Turn a module reference into a file path relative to the referencing file.
    fn resolve_reference(&self, from: &Path, reference: &str) -> PathBuf {
        let reference = reference.strip_prefix("./").unwrap_or(reference);
        let dir = from.parent().unwrap_or_else(|| Path::new(""));
        let candidate = dir.join(reference);

        if self.applies_to(&candidate) || candidate.is_file() {
            return clean_path(&candidate);
        }

        for ext in &self.extensions {
            let with_ext = PathBuf::from(format!("{}{}", candidate.display(), ext));
            if with_ext.is_file() {
                return clean_path(&with_ext);
            }
        }

        if candidate.is_dir() {
            for ext in &self.extensions {
                let index = candidate.join(format!("index{}", ext));
                if index.is_file() {
                    return clean_path(&index);
                }
            }
        }

        clean_path(&candidate)
    }
}

/// Absolute, lexically cleaned path with `.` and `..` folded away.
fn clean_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

fn path_key(path: &Path) -> String {
    clean_path(path)
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn express_resolver() -> MountResolver<'static> {
        MountResolver::new(
            &EXPRESS_MOUNT,
            EXPRESS_MOUNT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("routes")).unwrap();
        fs::write(
            dir.path().join("app.js"),
            "const express = require('express');\n\
             const app = express();\n\
             const usersRouter = require('./routes/users');\n\
             const postsRouter = require('./routes/posts.js');\n\
             app.use('/users', usersRouter);\n\
             app.use('/posts', postsRouter);\n\
             app.use('/ghost', notBound);\n",
        )
        .unwrap();
        fs::write(dir.path().join("routes/users.js"), "").unwrap();
        fs::write(dir.path().join("routes/posts.js"), "").unwrap();
        dir
    }

    #[test]
    fn test_resolves_bound_mounts() {
        let dir = project();
        let files = vec![
            dir.path().join("app.js"),
            dir.path().join("routes/users.js"),
            dir.path().join("routes/posts.js"),
        ];
        let map = express_resolver().resolve(&files);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&dir.path().join("routes/users.js")), Some("/users"));
        assert_eq!(map.get(&dir.path().join("routes/./posts.js")), Some("/posts"));
        assert_eq!(map.get(&dir.path().join("app.js")), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let dir = project();
        let files = vec![dir.path().join("app.js"), dir.path().join("routes/users.js")];
        let resolver = express_resolver();
        assert_eq!(resolver.resolve(&files), resolver.resolve(&files));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut map = BasePathMap::new();
        map.insert(Path::new("/srv/App/Routes/Users.js"), "/users");
        assert_eq!(map.get(Path::new("/srv/app/routes/users.js")), Some("/users"));
    }

    #[test]
    fn test_directory_reference_resolves_to_index() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/index.js"), "").unwrap();
        fs::write(
            dir.path().join("server.js"),
            "const api = require('./api');\napp.use('/api', api);\n",
        )
        .unwrap();

        let map = express_resolver().resolve(&[dir.path().join("server.js")]);
        assert_eq!(map.get(&dir.path().join("api/index.js")), Some("/api"));
    }

    #[test]
    fn test_later_mount_wins() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("users.js"), "").unwrap();
        fs::write(
            dir.path().join("a.js"),
            "const u = require('./users');\napp.use('/v1/users', u);\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.js"),
            "const u = require('./users');\napp.use('/v2/users', u);\n",
        )
        .unwrap();

        let map = express_resolver().resolve(&[dir.path().join("a.js"), dir.path().join("b.js")]);
        assert_eq!(map.get(&dir.path().join("users.js")), Some("/v2/users"));
    }
}
