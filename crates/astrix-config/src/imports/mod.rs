//! Import statements of Python scripts
//!
//! Scripts are scanned textually, never executed. Every `import` and
//! `from ... import` statement contributes the top-level name of the module
//! it loads; relative imports name the project itself and are skipped.

mod stdlib;

use camino::Utf8Path;
use indexmap::IndexSet;
use tracing::debug;

use astrix_core::error::AstrixError;

use crate::ConfigResult;

pub use stdlib::{is_stdlib, STDLIB_MODULES};

/// Top-level modules imported by a script, in first-import order
pub fn scan_imports(source: &str) -> Vec<String> {
    let mut modules = IndexSet::new();

    for statement in statements(source) {
        for module in imported_modules(&statement) {
            modules.insert(module);
        }
    }

    modules.into_iter().collect()
}

/// Read a script and scan its imports
pub async fn load_imports(path: &Utf8Path) -> ConfigResult<Vec<String>> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AstrixError::io(format!("Failed to read {}", path), e))?;

    let modules = scan_imports(&source);
    debug!("{} imports {} top-level modules", path, modules.len());
    Ok(modules)
}

/// Logical statements with comments, string blocks and line continuations
/// removed
fn statements(source: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut pending = String::new();
    let mut in_block: Option<&str> = None;

    for line in source.lines() {
        if let Some(quote) = in_block {
            if line.contains(quote) {
                in_block = None;
            }
            continue;
        }

        let code = strip_comment(line).trim();
        if let Some(quote) = opens_block(code) {
            in_block = Some(quote);
            continue;
        }

        match code.strip_suffix('\\') {
            Some(head) => {
                pending.push_str(head);
                pending.push(' ');
            },
            None => {
                pending.push_str(code);
                statements.extend(pending.split(';').map(|s| s.trim().to_string()));
                pending.clear();
            },
        }
    }

    statements
}

/// Triple quote that starts a string block left open on this line
fn opens_block(code: &str) -> Option<&'static str> {
    ["\"\"\"", "'''"].into_iter().find(|quote| {
        code.find(quote)
            .is_some_and(|start| !code[start + quote.len()..].contains(quote))
    })
}

fn strip_comment(line: &str) -> &str {
    let mut quote = None;
    for (index, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..index],
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if open == c => quote = None,
            _ => {},
        }
    }
    line
}

fn imported_modules(statement: &str) -> Vec<String> {
    if let Some(rest) = statement.strip_prefix("import ") {
        return rest
            .split(',')
            .filter_map(|alias| alias.split_whitespace().next())
            .filter_map(top_level)
            .collect();
    }

    if let Some(rest) = statement.strip_prefix("from ") {
        let mut words = rest.split_whitespace();
        if let (Some(module), Some("import")) = (words.next(), words.next()) {
            return top_level(module).into_iter().collect();
        }
    }

    Vec::new()
}

/// First dotted component; `None` for relative or malformed names
fn top_level(module: &str) -> Option<String> {
    let top = module.split('.').next()?;
    let valid = !top.is_empty()
        && !top.starts_with(|c: char| c.is_ascii_digit())
        && top.chars().all(|c| c.is_alphanumeric() || c == '_');
    valid.then(|| top.to_string())
}
