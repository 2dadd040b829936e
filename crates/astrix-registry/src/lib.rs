//! Package index client for Astrix
//!
//! This crate provides HTTP client functionality for fetching per-package
//! JSON metadata from a PyPI-compatible index, with retry logic and optional
//! authentication, and the `RequirementSource` seam the conflict detector
//! consumes.

pub mod api;
pub mod client;
pub mod source;

// Re-export main types
pub use api::{ProjectDetails, ProjectInfo, ProjectResponse};
pub use client::{AuthConfig, RegistryClient, RegistryOptions, RetryConfig};
pub use source::RequirementSource;

use astrix_core::error::AstrixError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, AstrixError>;
