//! Project configuration loaded from `routemap.toml`.
//!
//! ```toml
//! framework = "express"
//! output = "postman"
//! output_path = "exports"
//! plugin_dirs = ["tools/routemap-plugins"]
//!
//! [base_urls]
//! dev = "http://localhost:8080"
//! ```
//!
//! Every field is optional. Command-line flags override whatever the file sets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, RouteMapError};
use crate::export::Environment;

pub const CONFIG_FILE: &str = "routemap.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `auto` or a plugin / built-in name.
    pub framework: Option<String>,
    /// Export format name.
    pub output: Option<String>,
    /// Output directory; relative paths resolve against the project root.
    pub output_path: Option<PathBuf>,
    /// Extra plugin directories, searched before the default locations.
    pub plugin_dirs: Vec<PathBuf>,
    pub base_urls: BaseUrls,
}

/// Per-environment base URL overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseUrls {
    pub dev: Option<String>,
    pub staging: Option<String>,
    pub prod: Option<String>,
}

impl BaseUrls {
    /// The configured URL for `env`, or its built-in default.
    pub fn resolve(&self, env: Environment) -> String {
        let configured = match env {
            Environment::Dev => self.dev.as_deref(),
            Environment::Staging => self.staging.as_deref(),
            Environment::Prod => self.prod.as_deref(),
        };
        configured
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| env.default_base_url().to_string())
    }
}

impl Config {
    /// Load `routemap.toml` from the project root. A missing file yields defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| RouteMapError::io(&path, "read", e))?;
        let mut config = Self::parse(&content, &path)?;

        // Relative paths are relative to the project, not the cwd.
        config.output_path = config
            .output_path
            .map(|dir| if dir.is_relative() { root.join(dir) } else { dir });
        config.plugin_dirs = config
            .plugin_dirs
            .into_iter()
            .map(|dir| if dir.is_relative() { root.join(dir) } else { dir })
            .collect();

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| RouteMapError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
framework = "flask"
output = "insomnia"
plugin_dirs = ["custom"]

[base_urls]
staging = "https://staging.internal/"
"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.framework.as_deref(), Some("flask"));
        assert_eq!(config.output.as_deref(), Some("insomnia"));
        assert_eq!(config.plugin_dirs, vec![dir.path().join("custom")]);
        assert_eq!(
            config.base_urls.resolve(Environment::Staging),
            "https://staging.internal"
        );
        assert_eq!(config.base_urls.resolve(Environment::Dev), "http://localhost:3000");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "framework = [").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(RouteMapError::ConfigParse { .. })
        ));
    }
}
