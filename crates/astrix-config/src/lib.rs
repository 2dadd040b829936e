//! Configuration, manifest parsing and environment inspection for Astrix
//!
//! This crate turns the files around a project into the inputs of a
//! detection pass: layered `astrix.toml` settings, the declared dependencies
//! of a manifest, and the installed package snapshot of a site-packages
//! directory. Python scripts can also be scanned for the modules they
//! import.

pub mod environment;
pub mod imports;
pub mod manifest;
pub mod merge;
pub mod settings;

// Re-export main types
pub use environment::{
    inspect_site_packages, EnvironmentInspector, EnvironmentRecord, FileEnvironmentRecord,
};
pub use imports::{is_stdlib, load_imports, scan_imports};
pub use manifest::{load_manifest, ManifestFormat};
pub use merge::{CliOverrides, ConfigLayering, ConfigLoader, ConfigSource};
pub use settings::{
    AstrixConfig, ConfigFile, EnvironmentSettings, RegistrySettings, ResolverSettings,
};

use astrix_core::error::AstrixError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, AstrixError>;
