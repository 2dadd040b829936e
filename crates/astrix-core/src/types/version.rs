//! Dotted-numeric version type.
//!
//! A version is a release of one or more numeric components
//! (`major.minor.patch...`) followed by an optional suffix carrying
//! pre-release, post-release, dev or local identifiers. Ordering only looks
//! at the release; the suffix takes part in equality checks.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::AstrixError;

/// Concrete package version (`2.25.1`, `1.0`, `3.0.0rc1`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    release: Vec<u64>,
    suffix: Option<String>,
}

impl Version {
    /// Create a version from release components
    pub fn new(release: Vec<u64>) -> Self {
        Self {
            release,
            suffix: None,
        }
    }

    /// Release components as written
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Suffix after the release, if any
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    /// Release component at `index`, zero when missing
    pub fn component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Compare releases component by component, padding with zeros
    pub fn precedence_cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Check whether the padded release starts with `prefix`
    pub fn has_release_prefix(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, component)| self.component(i) == *component)
    }
}

impl FromStr for Version {
    type Err = AstrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || AstrixError::InvalidVersion {
            input: input.to_string(),
        };

        let bytes = input.as_bytes();
        let mut release = Vec::new();
        let mut pos = 0;

        loop {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if start == pos {
                return Err(invalid());
            }
            let component = input[start..pos].parse().map_err(|_| invalid())?;
            release.push(component);

            // A dot only continues the release when a digit follows it
            let continues = pos + 1 < bytes.len()
                && bytes[pos] == b'.'
                && bytes[pos + 1].is_ascii_digit();
            if !continues {
                break;
            }
            pos += 1;
        }

        let rest = &input[pos..];
        let suffix = if rest.is_empty() {
            None
        } else {
            let allowed = rest
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+'));
            if !allowed || !rest.chars().any(|c| c.is_ascii_alphabetic()) {
                return Err(invalid());
            }
            Some(rest.to_string())
        };

        Ok(Version { release, suffix })
    }
}

impl TryFrom<String> for Version {
    type Error = AstrixError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.release {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
            first = false;
        }

        if let Some(ref suffix) = self.suffix {
            write!(f, "{}", suffix)?;
        }

        Ok(())
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.precedence_cmp(other) == Ordering::Equal && self.suffix == other.suffix
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.precedence_cmp(other)
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}
