//! Conflict resolution engine for Astrix
//!
//! This crate compares a project's declared dependencies with an installed
//! package snapshot, expands missing dependencies into their registry
//! requirements, and plans remove-then-install commands for every conflict.
//! Nothing here mutates an environment.

pub mod detect;
pub mod plan;

// Re-export main types
pub use detect::{detect_conflicts, ConflictDetector, DetectionReport, DEFAULT_DEPTH};
pub use plan::plan;
