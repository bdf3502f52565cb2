//! # routemap
//!
//! Inventory the HTTP routes a backend project declares and export them as API-client
//! collections.
//!
//! Extraction is textual: built-in extractors cover Express, Flask, Django, Spring and
//! Laravel, and YAML plugins describe any other convention with regular expressions.
//! Routes carry the query and body field names found near their handlers, and Express
//! sub-routers pick up the prefix they are mounted under.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use routemap::{discover_files, load_plugins, FrameworkSelector, RouteExtractor};
//! use routemap::catalog::scanned_extensions;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let plugins = load_plugins(&[root.join("plugins")]);
//! let files = discover_files(root, &scanned_extensions(&plugins.registry)).unwrap();
//!
//! let mut extractor = RouteExtractor::new(FrameworkSelector::Auto, plugins.registry).unwrap();
//! for route in extractor.extract_all(&files) {
//!     println!("{}", route.name());
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod plugin;
pub mod route;

pub use catalog::discover_files;
pub use config::Config;
pub use error::{Result, RouteMapError};
pub use export::{render, Environment, ExportContext, ExportFormat};
pub use extract::{FrameworkSelector, RouteExtractor};
pub use plugin::{load_plugins, PluginRegistry};
pub use route::{HttpMethod, Route};
