//! Core data types for Astrix conflict resolution.
//!
//! This module provides the fundamental types used throughout Astrix:
//! - Version and constraint types with dotted-numeric precedence
//! - Declared dependencies, installed index and registry requirements
//! - Conflicts, diagnostics and resolution commands

pub mod conflict;
pub mod constraint;
pub mod dependency;
pub mod version;

// Re-export all public types
pub use conflict::{Action, Conflict, ConflictMap, Diagnostic, DiagnosticKind, ResolutionCommand};
pub use constraint::{satisfies, Clause, Operator, VersionConstraint};
pub use dependency::{DeclaredDependency, InstalledIndex, Requirement};
pub use version::Version;
