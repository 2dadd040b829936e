//! `setup.py` build scripts
//!
//! The script is never executed. The `install_requires` argument of the
//! `setup(...)` call is located textually and must be a literal list of
//! string literals.

use camino::Utf8Path;
use tracing::warn;

use astrix_core::types::DeclaredDependency;

use super::{exact_pin, parse_error};
use crate::ConfigResult;

const KEYWORD: &str = "install_requires";

pub(super) fn parse(content: &str, path: &Utf8Path) -> ConfigResult<Vec<DeclaredDependency>> {
    let call = setup_call(content).ok_or_else(|| parse_error(path, "no setup() call found"))?;
    let Some(value) = keyword_argument(&content[call..]) else {
        return Ok(Vec::new());
    };

    let list = value
        .strip_prefix('[')
        .ok_or_else(|| parse_error(path, "install_requires is not a literal list"))?;

    let entries = string_literals(list)
        .ok_or_else(|| parse_error(path, "unterminated install_requires list"))?;

    Ok(entries
        .iter()
        .filter_map(|entry| {
            let pin = exact_pin(entry);
            if pin.is_none() {
                warn!("Skipping '{}' in {}: only exact pins are supported", entry, path);
            }
            pin
        })
        .collect())
}

/// Offset just past the opening parenthesis of the first `setup(` call
fn setup_call(content: &str) -> Option<usize> {
    content.match_indices("setup").find_map(|(index, name)| {
        let rest = &content[index + name.len()..];
        let args = rest.trim_start().strip_prefix('(')?;
        Some(content.len() - args.len())
    })
}

/// Text after `install_requires =`, skipping mentions that are not a keyword
/// argument
fn keyword_argument(call: &str) -> Option<&str> {
    call.match_indices(KEYWORD).find_map(|(index, _)| {
        let value = call[index + KEYWORD.len()..].trim_start().strip_prefix('=')?;
        if value.starts_with('=') {
            return None;
        }
        Some(value.trim_start())
    })
}

/// String literals up to the closing bracket; `None` if the list never closes
fn string_literals(list: &str) -> Option<Vec<String>> {
    let mut literals = Vec::new();
    let mut chars = list.chars();

    while let Some(c) = chars.next() {
        match c {
            ']' => return Some(literals),
            '#' => {
                chars.by_ref().find(|&c| c == '\n');
            },
            '"' | '\'' => {
                let mut literal = String::new();
                loop {
                    match chars.next()? {
                        '\\' => literal.push(chars.next()?),
                        next if next == c => break,
                        next => literal.push(next),
                    }
                }
                literals.push(literal);
            },
            _ => {},
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(content: &str) -> ConfigResult<Vec<DeclaredDependency>> {
        parse(content, Utf8Path::new("setup.py"))
    }

    #[test]
    fn test_install_requires() {
        let deps = parse_str(
            r#"
from setuptools import setup, find_packages

setup(
    name="demo",
    packages=find_packages(),
    install_requires=[
        "requests==2.25.1",
        'click == 8.0.0',  # cli
        "numpy>=1.20",
    ],
)
"#,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec![
                DeclaredDependency::new("requests", "==2.25.1"),
                DeclaredDependency::new("click", "==8.0.0"),
            ]
        );
    }

    #[test]
    fn test_without_install_requires() {
        assert!(parse_str("setup(name='demo')").unwrap().is_empty());
    }

    #[test]
    fn test_without_setup_call() {
        assert!(parse_str("print('hello')").is_err());
    }

    #[test]
    fn test_non_literal_list() {
        let err = parse_str("REQS = []\nsetup(install_requires=REQS)").unwrap_err();
        assert!(err.to_string().contains("not a literal list"));
    }

    #[test]
    fn test_unterminated_list() {
        assert!(parse_str("setup(install_requires=['requests==2.0'").is_err());
    }

    #[test]
    fn test_mentions_outside_the_call_are_ignored() {
        let deps = parse_str(
            r#"
# install_requires: see below
from setuptools import setup

setup(
    name="demo",
    # install_requires lists exact pins only
    install_requires=["flask==2.0.1"],
)
"#,
        )
        .unwrap();

        assert_eq!(deps, vec![DeclaredDependency::new("flask", "==2.0.1")]);
    }

    #[test]
    fn test_setup_call_offset() {
        let content = "import setuptools\nsetuptools.setup (name='x')";
        let offset = setup_call(content).unwrap();
        assert_eq!(&content[offset..], "name='x')");
        assert_eq!(setup_call("setup_requires = []"), None);
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            string_literals(r#" "a", 'b\'c' ] "ignored""#),
            Some(vec!["a".to_string(), "b'c".to_string()])
        );
        assert_eq!(string_literals("\"open"), None);
    }
}
