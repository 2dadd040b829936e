//! `pyproject.toml` dependency tables
//!
//! Reads Poetry's `[tool.poetry.dependencies]` table followed by the PEP 621
//! `[project].dependencies` list. Poetry range shorthands are rewritten into
//! plain comparison clauses so the evaluator never sees them.

use camino::Utf8Path;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use astrix_core::types::{DeclaredDependency, Requirement};

use super::parse_error;
use crate::ConfigResult;

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    project: ProjectTable,
    #[serde(default)]
    tool: ToolTable,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectTable {
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    poetry: PoetryTable,
}

#[derive(Debug, Default, Deserialize)]
struct PoetryTable {
    #[serde(default)]
    dependencies: IndexMap<String, PoetryDependency>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PoetryDependency {
    Version(String),
    Detailed { version: Option<String> },
    Other(toml::Value),
}

pub(super) fn parse(content: &str, path: &Utf8Path) -> ConfigResult<Vec<DeclaredDependency>> {
    let document: PyProject =
        toml::from_str(content).map_err(|e| parse_error(path, e.to_string()))?;

    let mut dependencies = Vec::new();

    for (name, dependency) in document.tool.poetry.dependencies {
        if name.eq_ignore_ascii_case("python") {
            continue;
        }
        let spec = match dependency {
            PoetryDependency::Version(version) => version,
            PoetryDependency::Detailed { version } => version.unwrap_or_default(),
            PoetryDependency::Other(_) => {
                warn!("Skipping {} in {}: unsupported dependency form", name, path);
                continue;
            },
        };
        let constraint = translate_poetry(&spec).ok_or_else(|| {
            parse_error(path, format!("invalid version '{}' for {}", spec, name))
        })?;
        dependencies.push(DeclaredDependency::new(name, constraint));
    }

    for entry in document.project.dependencies {
        let requirement = Requirement::parse(&entry)
            .map_err(|e| parse_error(path, format!("'{}': {}", entry, e)))?;
        dependencies.push(DeclaredDependency::new(
            requirement.name,
            requirement.specifier.unwrap_or_default(),
        ));
    }

    Ok(dependencies)
}

/// Rewrite a Poetry version spec into comparison clauses.
///
/// `^` allows changes that keep the leftmost non-zero component, `~` allows
/// patch-level changes (minor-level for a single component), a bare version
/// is an exact pin and `*` matches anything. Returns `None` when a range
/// operand is not a dotted numeric release.
pub fn translate_poetry(spec: &str) -> Option<String> {
    let spec = spec.trim();
    if spec.is_empty() || spec == "*" {
        return Some(String::new());
    }

    let clauses = spec
        .split(',')
        .map(|part| translate_clause(part.trim()))
        .collect::<Option<Vec<_>>>()?;
    Some(clauses.join(","))
}

fn translate_clause(clause: &str) -> Option<String> {
    if let Some(version) = clause.strip_prefix('^') {
        let version = version.trim();
        let upper = bump(&release(version)?, Bump::Caret)?;
        return Some(format!(">={},<{}", version, upper));
    }
    if !clause.starts_with("~=") {
        if let Some(version) = clause.strip_prefix('~') {
            let version = version.trim();
            let upper = bump(&release(version)?, Bump::Tilde)?;
            return Some(format!(">={},<{}", version, upper));
        }
    }
    if clause.starts_with(|c: char| c.is_ascii_digit()) {
        return Some(format!("=={}", clause));
    }
    Some(clause.to_string())
}

enum Bump {
    Caret,
    Tilde,
}

fn release(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|part| part.parse().ok())
        .collect::<Option<Vec<u64>>>()
        .filter(|parts| !parts.is_empty())
}

/// Exclusive upper bound with the same number of components; `None` when the
/// bumped component would overflow
fn bump(parts: &[u64], kind: Bump) -> Option<String> {
    let index = match kind {
        Bump::Caret => parts
            .iter()
            .position(|&part| part != 0)
            .unwrap_or(parts.len() - 1),
        Bump::Tilde if parts.len() > 1 => 1,
        Bump::Tilde => 0,
    };

    let upper = parts
        .iter()
        .enumerate()
        .map(|(i, &part)| match i.cmp(&index) {
            std::cmp::Ordering::Less => Some(part.to_string()),
            std::cmp::Ordering::Equal => part.checked_add(1).map(|next| next.to_string()),
            std::cmp::Ordering::Greater => Some("0".to_string()),
        })
        .collect::<Option<Vec<_>>>()?;
    Some(upper.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(content: &str) -> ConfigResult<Vec<DeclaredDependency>> {
        parse(content, Utf8Path::new("pyproject.toml"))
    }

    #[test]
    fn test_poetry_dependencies() {
        let deps = parse_str(
            r#"
[tool.poetry.dependencies]
python = "^3.8"
requests = "^2.25.1"
flask = { version = "~2.0", extras = ["async"] }
click = "*"
local-lib = { path = "../lib" }
"#,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec![
                DeclaredDependency::new("requests", ">=2.25.1,<3.0.0"),
                DeclaredDependency::new("flask", ">=2.0,<2.1"),
                DeclaredDependency::new("click", ""),
                DeclaredDependency::new("local-lib", ""),
            ]
        );
    }

    #[test]
    fn test_pep621_dependencies() {
        let deps = parse_str(
            r#"
[project]
name = "demo"
dependencies = [
    "httpx>=0.24",
    "rich",
    "pydantic[email] (>=2.0, <3.0)",
]
"#,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec![
                DeclaredDependency::new("httpx", ">=0.24"),
                DeclaredDependency::new("rich", ""),
                DeclaredDependency::new("pydantic", ">=2.0, <3.0"),
            ]
        );
    }

    #[test]
    fn test_no_dependency_tables() {
        assert!(parse_str("[build-system]\nrequires = [\"setuptools\"]\n")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            parse_str("[tool.poetry.dependencies\n"),
            Err(astrix_core::error::AstrixError::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_bad_caret_operand() {
        assert!(parse_str("[tool.poetry.dependencies]\nfoo = \"^1.x\"\n").is_err());
    }

    #[test]
    fn test_overflowing_bound_is_rejected() {
        assert_eq!(translate_poetry("^18446744073709551615"), None);
        assert_eq!(translate_poetry("~1.18446744073709551615"), None);
        assert_eq!(
            translate_poetry("^1.18446744073709551615").unwrap(),
            ">=1.18446744073709551615,<2.0"
        );

        let err = parse_str("[tool.poetry.dependencies]\nfoo = \"^18446744073709551615\"\n")
            .unwrap_err();
        assert!(matches!(
            err,
            astrix_core::error::AstrixError::ManifestParse { .. }
        ));
    }

    #[test]
    fn test_translate_caret() {
        assert_eq!(translate_poetry("^1.2.3").unwrap(), ">=1.2.3,<2.0.0");
        assert_eq!(translate_poetry("^0.2.3").unwrap(), ">=0.2.3,<0.3.0");
        assert_eq!(translate_poetry("^0.0.3").unwrap(), ">=0.0.3,<0.0.4");
        assert_eq!(translate_poetry("^0.0").unwrap(), ">=0.0,<0.1");
        assert_eq!(translate_poetry("^1").unwrap(), ">=1,<2");
    }

    #[test]
    fn test_translate_tilde() {
        assert_eq!(translate_poetry("~1.2.3").unwrap(), ">=1.2.3,<1.3.0");
        assert_eq!(translate_poetry("~1.2").unwrap(), ">=1.2,<1.3");
        assert_eq!(translate_poetry("~1").unwrap(), ">=1,<2");
        assert_eq!(translate_poetry("~=1.4").unwrap(), "~=1.4");
    }

    #[test]
    fn test_translate_passthrough() {
        assert_eq!(translate_poetry("*").unwrap(), "");
        assert_eq!(translate_poetry("").unwrap(), "");
        assert_eq!(translate_poetry("1.2.3").unwrap(), "==1.2.3");
        assert_eq!(translate_poetry(">=1.2, <1.5").unwrap(), ">=1.2,<1.5");
    }

    #[test]
    fn test_translated_constraints_evaluate() {
        let constraint = translate_poetry("^2.25.1").unwrap();
        assert!(astrix_core::types::satisfies("2.31.0", &constraint).unwrap());
        assert!(!astrix_core::types::satisfies("3.0.0", &constraint).unwrap());
    }
}
