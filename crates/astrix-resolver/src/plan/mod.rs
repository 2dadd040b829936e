//! Resolution planning
//!
//! Every conflict becomes one remove-then-install pair targeting the
//! constraint that was violated. Plans are descriptions only; executing them
//! is left to the caller.

use tracing::debug;

use astrix_core::types::{ConflictMap, ResolutionCommand};

/// Plan one command per conflict, in conflict order
pub fn plan(conflicts: &ConflictMap) -> Vec<ResolutionCommand> {
    let commands: Vec<ResolutionCommand> = conflicts
        .values()
        .map(|conflict| ResolutionCommand::new(&conflict.package, &conflict.required))
        .collect();

    debug!("Planned {} resolution commands", commands.len());
    commands
}
