//! Outputs of a resolution pass: conflicts, diagnostics and planned commands.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::error::AstrixError;

/// A package whose installed version misses its required constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub package: String,
    /// Installed version, `None` when the package is absent
    pub installed: Option<String>,
    /// Constraint text the package must satisfy
    pub required: String,
}

/// Conflicts keyed by lower-cased package name in first-insertion order
pub type ConflictMap = IndexMap<String, Conflict>;

/// A non-fatal problem met while detecting conflicts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub package: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    InvalidConstraint,
    InvalidVersion,
    RegistryUnavailable,
}

/// A literal action descriptor; never executed by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Remove { package: String },
    Install { package: String, target: String },
}

/// Remove-then-install pair correcting one conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionCommand {
    pub remove: Action,
    pub install: Action,
}

impl Conflict {
    /// Installed but unsatisfying
    pub fn outdated(package: &str, installed: &str, required: &str) -> Self {
        Self {
            package: package.to_string(),
            installed: Some(installed.to_string()),
            required: required.to_string(),
        }
    }

    /// Not installed at all
    pub fn missing(package: &str, required: &str) -> Self {
        Self {
            package: package.to_string(),
            installed: None,
            required: required.to_string(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.installed.is_none()
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let required = if self.required.is_empty() {
            "any version"
        } else {
            self.required.as_str()
        };
        match self.installed {
            Some(ref installed) => write!(
                f,
                "{}: installed {}, required {}",
                self.package, installed, required
            ),
            None => write!(f, "{}: not installed, required {}", self.package, required),
        }
    }
}

impl Diagnostic {
    /// Build a diagnostic from an evaluator or registry error
    pub fn from_error(package: &str, error: &AstrixError) -> Self {
        let kind = match error {
            AstrixError::InvalidVersion { .. } => DiagnosticKind::InvalidVersion,
            AstrixError::InvalidConstraint { .. } => DiagnosticKind::InvalidConstraint,
            _ => DiagnosticKind::RegistryUnavailable,
        };
        Self {
            package: package.to_string(),
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.package, self.message)
    }
}

impl Action {
    pub fn package(&self) -> &str {
        match self {
            Action::Remove { package } | Action::Install { package, .. } => package,
        }
    }
}

impl ResolutionCommand {
    /// Plan the removal of `package` followed by its install at `target`
    pub fn new(package: &str, target: &str) -> Self {
        Self {
            remove: Action::Remove {
                package: package.to_string(),
            },
            install: Action::Install {
                package: package.to_string(),
                target: target.to_string(),
            },
        }
    }

    pub fn package(&self) -> &str {
        self.remove.package()
    }

    /// Literal constraint text the install action targets
    pub fn target(&self) -> &str {
        match self.install {
            Action::Install { ref target, .. } => target,
            Action::Remove { .. } => "",
        }
    }
}
