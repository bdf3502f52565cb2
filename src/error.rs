//! Error types for routemap.
//!
//! Most failures in the extraction pipeline are file-local or plugin-local and are
//! logged and skipped rather than returned. The variants here cover the ones that
//! reach a caller: configuration problems, plugin loading, and output writing.

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for routemap operations.
#[derive(Error, Debug)]
pub enum RouteMapError {
    /// A framework was pinned but neither a plugin nor a built-in extractor has that name.
    #[error("framework '{name}' not found. Available frameworks: {available}")]
    UnknownFramework { name: String, available: String },

    /// Framework selector was empty.
    #[error("framework name cannot be empty")]
    EmptyFramework,

    /// I/O failure with the path it happened on.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Plugin definition could not be parsed.
    #[error("failed to parse plugin {path}: {source}")]
    PluginParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Plugin definition parsed but is unusable.
    #[error("invalid plugin {plugin}: {message}")]
    InvalidPlugin { plugin: String, message: String },

    /// A regex in a plugin definition failed to compile.
    #[error("invalid regex '{pattern}' in plugin {plugin}: {source}")]
    InvalidPattern {
        plugin: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Unsupported export format.
    #[error("unsupported output format '{0}'. Use 'postman', 'insomnia', 'httpie', 'curl', or 'markdown'")]
    UnsupportedFormat(String),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouteMapError {
    /// Wrap an I/O error with the path and operation that caused it.
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        RouteMapError::Io {
            path: path.into(),
            operation,
            source,
        }
    }
}

/// Result type alias for routemap operations.
pub type Result<T> = std::result::Result<T, RouteMapError>;
