//! # astrix-core
//!
//! Core types and utilities shared across all Astrix crates.
//!
//! This crate provides:
//! - Version and VersionConstraint types with dotted-numeric precedence
//! - DeclaredDependency, InstalledIndex and Requirement inputs for detection
//! - Conflict, Diagnostic and ResolutionCommand outputs of a resolution pass
//! - AstrixError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (Version, VersionConstraint, Conflict, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AstrixError, AstrixResult};
pub use types::{
    satisfies, Action, Conflict, ConflictMap, DeclaredDependency, Diagnostic, DiagnosticKind,
    InstalledIndex, Requirement, ResolutionCommand, Version, VersionConstraint,
};
