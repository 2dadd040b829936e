//! Manifest parsing into declared dependencies
//!
//! The format is decided once from the file name; each variant has its own
//! parser and all of them produce [`DeclaredDependency`] lists in manifest
//! order.

mod pin_list;
mod pyproject;
mod setup_py;

use camino::Utf8Path;
use tracing::debug;

use astrix_core::error::AstrixError;
use astrix_core::types::DeclaredDependency;

use crate::ConfigResult;

pub use pyproject::translate_poetry;

/// Supported manifest formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// `requirements.txt` style `name==version` lines
    PinList,
    /// `pyproject.toml` dependency tables
    DeclarativeTable,
    /// `setup.py` with an `install_requires` list
    BuildScript,
}

impl ManifestFormat {
    /// Resolve the format from a manifest path
    pub fn detect(path: &Utf8Path) -> ConfigResult<Self> {
        let unsupported = || AstrixError::UnsupportedManifest {
            path: path.to_string(),
        };
        let file_name = path.file_name().ok_or_else(unsupported)?;

        match file_name {
            "pyproject.toml" => Ok(Self::DeclarativeTable),
            "setup.py" => Ok(Self::BuildScript),
            name if name.ends_with(".txt") => Ok(Self::PinList),
            _ => Err(unsupported()),
        }
    }

    /// Parse manifest text; `path` is used in error messages only
    pub fn parse(self, content: &str, path: &Utf8Path) -> ConfigResult<Vec<DeclaredDependency>> {
        match self {
            Self::PinList => Ok(pin_list::parse(content)),
            Self::DeclarativeTable => pyproject::parse(content, path),
            Self::BuildScript => setup_py::parse(content, path),
        }
    }
}

/// Read and parse a manifest from disk
pub async fn load_manifest(path: &Utf8Path) -> ConfigResult<Vec<DeclaredDependency>> {
    let format = ManifestFormat::detect(path)?;
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AstrixError::io(format!("Failed to read {}", path), e))?;

    let dependencies = format.parse(&content, path)?;
    debug!(
        "Parsed {} dependencies from {} ({:?})",
        dependencies.len(),
        path,
        format
    );
    Ok(dependencies)
}

/// Split a `name==version` entry into an exact pin
fn exact_pin(entry: &str) -> Option<DeclaredDependency> {
    let entry = entry.split(';').next().unwrap_or_default();
    let (name, version) = entry.split_once("==")?;
    let name = name.split('[').next().unwrap_or_default().trim();
    let version = version.trim();

    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some(DeclaredDependency::new(name, format!("=={}", version)))
}

fn parse_error(path: &Utf8Path, message: impl Into<String>) -> AstrixError {
    AstrixError::ManifestParse {
        path: path.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_format() {
        let cases = [
            ("requirements.txt", ManifestFormat::PinList),
            ("dev-requirements.txt", ManifestFormat::PinList),
            ("project/pyproject.toml", ManifestFormat::DeclarativeTable),
            ("setup.py", ManifestFormat::BuildScript),
        ];
        for (path, expected) in cases {
            assert_eq!(ManifestFormat::detect(Utf8Path::new(path)).unwrap(), expected);
        }
    }

    #[test]
    fn test_unsupported_manifest() {
        for path in ["Pipfile", "setup.cfg", "package.json", "/"] {
            assert!(matches!(
                ManifestFormat::detect(Utf8Path::new(path)),
                Err(AstrixError::UnsupportedManifest { .. })
            ));
        }
    }

    #[test]
    fn test_exact_pin() {
        assert_eq!(
            exact_pin("requests[socks] == 2.25.1 ; python_version >= '3.8'"),
            Some(DeclaredDependency::new("requests", "==2.25.1"))
        );
        assert_eq!(exact_pin("flask>=2.0"), None);
        assert_eq!(exact_pin("==1.0"), None);
    }

    #[tokio::test]
    async fn test_load_manifest_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(temp_dir.path().join("requirements.txt")).unwrap();
        tokio::fs::write(&path, "requests==2.25.1\nflask==2.0.1\n")
            .await
            .unwrap();

        let deps = load_manifest(&path).await.unwrap();
        assert_eq!(
            deps,
            vec![
                DeclaredDependency::new("requests", "==2.25.1"),
                DeclaredDependency::new("flask", "==2.0.1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(temp_dir.path().join("requirements.txt")).unwrap();

        assert!(matches!(
            load_manifest(&path).await,
            Err(AstrixError::Io { .. })
        ));
    }
}
