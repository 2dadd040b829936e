//! Conflict detection between declared dependencies and installed packages
//!
//! A single ordered, non-backtracking pass. Installed dependencies are checked
//! against their declared constraint; missing ones are expanded into the
//! requirements the registry reports for them, up to a fixed depth, and those
//! requirements are checked against the installed index in turn. Conflicts are
//! keyed by lower-cased package name and later records overwrite earlier ones.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use astrix_core::error::AstrixError;
use astrix_core::types::{
    satisfies, Conflict, ConflictMap, DeclaredDependency, Diagnostic, InstalledIndex, Requirement,
};
use astrix_registry::RequirementSource;

/// Levels of transitive expansion for a missing direct dependency
pub const DEFAULT_DEPTH: usize = 1;

/// Requirements fetched during one pass, keyed by lower-cased package name
type Fetched = HashMap<String, Vec<Requirement>>;

/// Outcome of one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionReport {
    /// Unsatisfied requirements keyed by lower-cased package name
    pub conflicts: ConflictMap,
    /// Requirements that could not be evaluated, and registry failures
    pub diagnostics: Vec<Diagnostic>,
}

impl DetectionReport {
    /// No conflicts were found
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    fn record(&mut self, conflict: Conflict) {
        let key = conflict.package.to_lowercase();
        if let Some(previous) = self.conflicts.insert(key, conflict) {
            debug!(
                "Conflict for {} (required {}) overwritten by a later requirement",
                previous.package, previous.required
            );
        }
    }

    fn diagnose(&mut self, package: &str, error: &AstrixError) {
        self.diagnostics.push(Diagnostic::from_error(package, error));
    }
}

/// Detects conflicts using a requirement source for missing dependencies
#[derive(Debug)]
pub struct ConflictDetector<'a, S> {
    source: &'a S,
    depth: usize,
}

impl<'a, S: RequirementSource> ConflictDetector<'a, S> {
    /// Create a detector with the default expansion depth
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            depth: DEFAULT_DEPTH,
        }
    }

    /// Set how many levels of requirements a missing dependency expands into.
    /// Zero records missing dependencies without consulting the source.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run one pass over `declared` in order
    pub async fn detect(
        &self,
        declared: &[DeclaredDependency],
        installed: &InstalledIndex,
    ) -> DetectionReport {
        let mut report = DetectionReport::default();
        let mut fetched = Fetched::new();

        for dependency in declared {
            match installed.get(&dependency.name) {
                Some(version) => check(
                    &dependency.name,
                    version,
                    &dependency.constraint,
                    &mut report,
                ),
                None => {
                    self.expand_missing(dependency, installed, &mut fetched, &mut report)
                        .await
                },
            }
        }

        info!(
            "Checked {} declared dependencies: {} conflicts, {} diagnostics",
            declared.len(),
            report.conflicts.len(),
            report.diagnostics.len()
        );
        report
    }

    async fn expand_missing(
        &self,
        dependency: &DeclaredDependency,
        installed: &InstalledIndex,
        fetched: &mut Fetched,
        report: &mut DetectionReport,
    ) {
        if self.depth == 0 {
            report.record(Conflict::missing(&dependency.name, &dependency.constraint));
            return;
        }

        debug!("{} is not installed, checking its requirements", dependency.name);
        let requirements = self.requirements_of(&dependency.name, fetched, report).await;
        if requirements.is_empty() {
            debug!("No requirements found for {}", dependency.name);
            report.record(Conflict::missing(&dependency.name, &dependency.constraint));
            return;
        }

        let mut frontier = vec![(dependency.name.clone(), requirements)];

        for level in 1..=self.depth {
            let mut next = Vec::new();

            for (requirer, requirements) in frontier {
                for requirement in requirements {
                    match installed.get(&requirement.name) {
                        Some(version) => {
                            if let Some(ref specifier) = requirement.specifier {
                                check(&requirement.name, version, specifier, report);
                            }
                        },
                        None if level < self.depth
                            && !fetched.contains_key(&requirement.name.to_lowercase()) =>
                        {
                            let nested =
                                self.requirements_of(&requirement.name, fetched, report).await;
                            next.push((requirement.name, nested));
                        },
                        None => {
                            debug!(
                                "Requirement {} of {} is not installed or already expanded",
                                requirement.name, requirer
                            );
                        },
                    }
                }
            }

            if next.is_empty() {
                break;
            }
            frontier = next;
        }
    }

    /// Requirements of `package`, fetched at most once per pass. Source
    /// failures degrade to an empty list.
    async fn requirements_of(
        &self,
        package: &str,
        fetched: &mut Fetched,
        report: &mut DetectionReport,
    ) -> Vec<Requirement> {
        let key = package.to_lowercase();
        if let Some(requirements) = fetched.get(&key) {
            debug!("Reusing requirements of {} fetched earlier in this pass", package);
            return requirements.clone();
        }

        let requirements = match self.source.fetch_requirements(package, None).await {
            Ok(requirements) => requirements,
            Err(error) => {
                warn!("Could not fetch requirements of {}: {}", package, error);
                report.diagnose(package, &error);
                Vec::new()
            },
        };
        fetched.insert(key, requirements.clone());
        requirements
    }
}

fn check(package: &str, installed: &str, constraint: &str, report: &mut DetectionReport) {
    match satisfies(installed, constraint) {
        Ok(true) => debug!("{} {} satisfies '{}'", package, installed, constraint),
        Ok(false) => report.record(Conflict::outdated(package, installed, constraint)),
        Err(error) => {
            warn!("Skipping requirement on {}: {}", package, error);
            report.diagnose(package, &error);
        },
    }
}

/// Detect conflicts with the default expansion depth
pub async fn detect_conflicts<S: RequirementSource>(
    declared: &[DeclaredDependency],
    installed: &InstalledIndex,
    source: &S,
) -> DetectionReport {
    ConflictDetector::new(source).detect(declared, installed).await
}
