//! Error types and result aliases for Astrix operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the Astrix crates with actionable error messages.

use thiserror::Error;

/// Unified error type for all Astrix operations
#[derive(Error, Debug)]
pub enum AstrixError {
    // Evaluator errors
    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("Invalid version '{input}'")]
    InvalidVersion { input: String },

    // Registry errors
    #[error("Package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("Registry unavailable for '{package}': {message}")]
    RegistryUnavailable {
        package: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Manifest and config errors
    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse { path: String, message: String },

    #[error("Unsupported manifest format: {path}")]
    UnsupportedManifest { path: String },

    #[error("Failed to parse astrix.toml: {message}")]
    TomlParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // Output errors
    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: String, message: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Astrix operations
pub type AstrixResult<T> = Result<T, AstrixError>;

impl AstrixError {
    /// Create a registry error from any error type
    pub fn registry<E>(package: &str, message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RegistryUnavailable {
            package: package.to_string(),
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a serialization error for an output document
    pub fn serialization(what: &str, error: impl std::fmt::Display) -> Self {
        Self::Serialization {
            what: what.to_string(),
            message: error.to_string(),
        }
    }

    /// Shorthand for an invalid constraint error
    pub fn invalid_constraint(constraint: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if retrying the operation could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AstrixError::RegistryUnavailable { .. } | AstrixError::Io { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            AstrixError::InvalidConstraint { .. } => {
                Some("Use clauses like '>=1.0, <2.0' with ==, !=, >=, <=, >, < or ~=")
            },
            AstrixError::InvalidVersion { .. } => {
                Some("Versions must be dotted numbers such as '2.25.1'")
            },
            AstrixError::PackageNotFound { .. } => {
                Some("Check the package name spelling or the configured registry URL")
            },
            AstrixError::RegistryUnavailable { .. } => {
                Some("Check your internet connection and try again")
            },
            AstrixError::UnsupportedManifest { .. } => {
                Some("Point astrix at a requirements .txt file, pyproject.toml or setup.py")
            },
            AstrixError::ConfigValidation { .. } | AstrixError::TomlParse { .. } => {
                Some("Fix astrix.toml or the ASTRIX_* environment variables")
            },
            _ => None,
        }
    }
}
