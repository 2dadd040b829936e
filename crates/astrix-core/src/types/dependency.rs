//! Dependency inputs of a resolution pass.
//!
//! Declared dependencies come from the project manifest, the installed index
//! from the active environment, and requirements from registry metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{AstrixError, AstrixResult};

/// A (name, constraint) pair declared by the project manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    /// Package name as written in the manifest
    pub name: String,
    /// Constraint text; empty means any version
    pub constraint: String,
}

/// Snapshot of installed packages keyed by lower-cased name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledIndex {
    packages: HashMap<String, String>,
}

/// A requirement another package declares on `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    /// Specifier text; `None` means any version
    pub specifier: Option<String>,
}

impl DeclaredDependency {
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
        }
    }

    /// Dependency accepting any version
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }
}

impl InstalledIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an installed package; the name is lower-cased
    pub fn insert(&mut self, name: &str, version: impl Into<String>) {
        self.packages.insert(name.to_lowercase(), version.into());
    }

    /// Installed version of `name`, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&str> {
        self.packages.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for InstalledIndex
where
    N: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (name, version) in iter {
            index.insert(name.as_ref(), version);
        }
        index
    }
}

impl Requirement {
    pub fn new(name: impl Into<String>, specifier: Option<String>) -> Self {
        Self {
            name: name.into(),
            specifier,
        }
    }

    /// Parse a requirement string such as `urllib3<3,>=1.21.1`,
    /// `numpy (>=1.21.0)` or `PySocks!=1.5.7; extra == "socks"`.
    ///
    /// Environment markers after `;` and extras in `[...]` are dropped.
    pub fn parse(input: &str) -> AstrixResult<Self> {
        let invalid = |reason: &str| AstrixError::invalid_constraint(input, reason);

        let without_marker = input.split(';').next().unwrap_or_default().trim();
        let name_len = without_marker
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
            .unwrap_or(without_marker.len());
        let name = &without_marker[..name_len];
        if !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(invalid("missing package name"));
        }

        let mut rest = without_marker[name_len..].trim_start();
        if let Some(extras) = rest.strip_prefix('[') {
            let close = extras.find(']').ok_or_else(|| invalid("unterminated extras"))?;
            rest = extras[close + 1..].trim_start();
        }
        if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
            rest = inner.trim();
        }
        // Direct references (`name @ url`) pin no version
        if rest.starts_with('@') {
            rest = "";
        }

        let specifier = match rest.trim() {
            "" => None,
            spec => Some(spec.to_string()),
        };
        Ok(Self::new(name, specifier))
    }

    /// Whether this requirement accepts any version
    pub fn is_any(&self) -> bool {
        self.specifier.is_none()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref spec) = self.specifier {
            write!(f, "{}", spec)?;
        }
        Ok(())
    }
}
