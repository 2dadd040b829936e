//! Version constraints: comma-separated conjunctions of range clauses.
//!
//! `">=2.0, <3.0"` is satisfied by a version that satisfies every clause.
//! The empty constraint is satisfied by any version.

use std::fmt;
use std::str::FromStr;

use super::Version;
use crate::error::{AstrixError, AstrixResult};

/// Comparison operator of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,      // ==1.0
    NotEqual,   // !=1.0
    GreaterEq,  // >=1.0
    LessEq,     // <=1.0
    Greater,    // >1.0
    Less,       // <1.0
    Compatible, // ~=1.4
}

/// Two-character operators must be tried before their one-character prefixes
const OPERATORS: [(&str, Operator); 7] = [
    ("~=", Operator::Compatible),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    (">=", Operator::GreaterEq),
    ("<=", Operator::LessEq),
    (">", Operator::Greater),
    ("<", Operator::Less),
];

/// One operator/version pair of a constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub op: Operator,
    pub version: Version,
    /// Trailing `.*`, only legal with `==` and `!=`
    pub wildcard: bool,
}

/// Parsed conjunction of clauses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionConstraint {
    clauses: Vec<Clause>,
}

impl Operator {
    /// Operator token as written in a constraint
    pub fn as_str(&self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(token, _)| *token)
            .unwrap_or("==")
    }
}

impl Clause {
    /// Check if a version satisfies this clause
    pub fn matches(&self, version: &Version) -> bool {
        use std::cmp::Ordering::*;

        let ord = version.precedence_cmp(&self.version);
        match self.op {
            Operator::Equal => self.matches_equal(version),
            Operator::NotEqual => !self.matches_equal(version),
            Operator::GreaterEq => ord != Less,
            Operator::LessEq => ord != Greater,
            Operator::Greater => ord == Greater,
            Operator::Less => ord == Less,
            Operator::Compatible => {
                // ~=X.Y.Z is >=X.Y.Z together with ==X.Y.*
                let release = self.version.release();
                let fixed = &release[..release.len().saturating_sub(1)];
                ord != Less && version.has_release_prefix(fixed)
            },
        }
    }

    fn matches_equal(&self, version: &Version) -> bool {
        if self.wildcard {
            version.has_release_prefix(self.version.release())
        } else {
            version == &self.version
        }
    }

    fn parse(constraint: &str, clause: &str) -> AstrixResult<Self> {
        let clause = clause.trim();
        if clause.is_empty() {
            return Err(AstrixError::invalid_constraint(constraint, "empty clause"));
        }
        if clause.starts_with("===") {
            return Err(AstrixError::invalid_constraint(
                constraint,
                "unsupported operator '==='",
            ));
        }

        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(token, op)| clause.strip_prefix(token).map(|rest| (*op, rest.trim())))
            .ok_or_else(|| {
                AstrixError::invalid_constraint(
                    constraint,
                    format!("unrecognized operator in '{}'", clause),
                )
            })?;

        let (version_text, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) => (prefix, true),
            None => (rest, false),
        };
        if wildcard && !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(AstrixError::invalid_constraint(
                constraint,
                format!("wildcard not allowed with '{}'", op.as_str()),
            ));
        }

        let version = Version::from_str(version_text).map_err(|_| {
            AstrixError::invalid_constraint(constraint, format!("unrecognized version '{}'", rest))
        })?;
        if wildcard && version.suffix().is_some() {
            return Err(AstrixError::invalid_constraint(
                constraint,
                format!("wildcard after suffixed version '{}'", rest),
            ));
        }
        if op == Operator::Compatible && version.release().len() < 2 {
            return Err(AstrixError::invalid_constraint(
                constraint,
                "'~=' needs at least two release components",
            ));
        }

        Ok(Clause {
            op,
            version,
            wildcard,
        })
    }
}

impl VersionConstraint {
    /// Constraint satisfied by every version
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated constraint; blank input means any version
    pub fn parse(input: &str) -> AstrixResult<Self> {
        if input.trim().is_empty() {
            return Ok(Self::any());
        }

        let clauses = input
            .split(',')
            .map(|clause| Clause::parse(input, clause))
            .collect::<AstrixResult<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    /// Whether this constraint has no clauses
    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Check if a version satisfies every clause
    pub fn matches(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.matches(version))
    }
}

impl FromStr for VersionConstraint {
    type Err = AstrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        f.write_str(&rendered.join(", "))
    }
}

/// Check a version string against a constraint string.
///
/// The version is validated first, so a malformed installed version fails
/// with `InvalidVersion` even when the constraint is empty.
pub fn satisfies(version: &str, constraint: &str) -> AstrixResult<bool> {
    let version = Version::from_str(version)?;
    let constraint = VersionConstraint::parse(constraint)?;
    Ok(constraint.matches(&version))
}
