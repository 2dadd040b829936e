//! Installed package inspection and recorded environments
//!
//! The installed snapshot is read from the metadata files that installers
//! leave in site-packages: `*.dist-info/METADATA` for wheels and
//! `*.egg-info/PKG-INFO` (a directory or a bare file) for eggs.

mod record;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use astrix_core::error::AstrixError;
use astrix_core::types::InstalledIndex;

use crate::settings::EnvironmentSettings;
use crate::ConfigResult;

pub use record::{EnvironmentRecord, FileEnvironmentRecord};

/// Reads installed distributions from site-packages directories
#[derive(Debug, Clone)]
pub struct EnvironmentInspector {
    site_packages: Vec<Utf8PathBuf>,
}

impl EnvironmentInspector {
    pub fn new(site_packages: Vec<Utf8PathBuf>) -> Self {
        Self { site_packages }
    }

    /// Use the configured directories, or the active virtualenv when none are
    pub fn from_settings(settings: &EnvironmentSettings) -> ConfigResult<Self> {
        if settings.site_packages.is_empty() {
            return Self::from_virtual_env();
        }
        Ok(Self::new(
            settings.site_packages.iter().map(Utf8PathBuf::from).collect(),
        ))
    }

    /// Inspect the virtualenv named by `VIRTUAL_ENV`
    pub fn from_virtual_env() -> ConfigResult<Self> {
        let venv = std::env::var("VIRTUAL_ENV").map_err(|_| AstrixError::ConfigValidation {
            field: "environment.site_packages".to_string(),
            reason: "no site-packages configured and VIRTUAL_ENV is not set".to_string(),
        })?;

        let site_packages = discover_site_packages(Utf8Path::new(&venv));
        if site_packages.is_empty() {
            return Err(AstrixError::ConfigValidation {
                field: "VIRTUAL_ENV".to_string(),
                reason: format!("no site-packages directory found under {}", venv),
            });
        }
        Ok(Self::new(site_packages))
    }

    pub fn site_packages(&self) -> &[Utf8PathBuf] {
        &self.site_packages
    }

    /// Build the installed index; later directories win on duplicate names
    pub async fn inspect(&self) -> ConfigResult<InstalledIndex> {
        let mut index = InstalledIndex::new();

        for dir in &self.site_packages {
            if !dir.is_dir() {
                return Err(AstrixError::io(
                    format!("Site-packages directory {} is not readable", dir),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }

            for metadata in metadata_files(dir) {
                let content = tokio::fs::read_to_string(&metadata)
                    .await
                    .map_err(|e| AstrixError::io(format!("Failed to read {}", metadata), e))?;

                match parse_metadata(&content) {
                    Some((name, version)) => index.insert(name, version),
                    None => warn!("Ignoring {}: missing Name or Version header", metadata),
                }
            }
        }

        debug!(
            "Found {} installed packages in {} directories",
            index.len(),
            self.site_packages.len()
        );
        Ok(index)
    }
}

/// Inspect explicit site-packages directories
pub async fn inspect_site_packages(dirs: &[Utf8PathBuf]) -> ConfigResult<InstalledIndex> {
    EnvironmentInspector::new(dirs.to_vec()).inspect().await
}

/// Site-packages directories of a virtualenv on POSIX and Windows layouts
pub fn discover_site_packages(venv: &Utf8Path) -> Vec<Utf8PathBuf> {
    let pattern = venv.join("lib").join("python*").join("site-packages");
    let mut found: Vec<Utf8PathBuf> = glob::glob(pattern.as_str())
        .map(|paths| {
            paths
                .filter_map(Result::ok)
                .filter_map(|path| Utf8PathBuf::try_from(path).ok())
                .collect()
        })
        .unwrap_or_default();

    let windows = venv.join("Lib").join("site-packages");
    if windows.is_dir() && !found.contains(&windows) {
        found.push(windows);
    }
    found
}

fn metadata_files(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|entry| Utf8PathBuf::try_from(entry.into_path()).ok())
        .filter_map(|path| {
            let name = path.file_name()?;
            if name.ends_with(".dist-info") {
                Some(path.join("METADATA"))
            } else if name.ends_with(".egg-info") && path.is_dir() {
                Some(path.join("PKG-INFO"))
            } else if name.ends_with(".egg-info") {
                Some(path)
            } else {
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    files.sort();
    files
}

/// `Name` and `Version` from the RFC 822 style header block
fn parse_metadata(content: &str) -> Option<(&str, &str)> {
    let mut name = None;
    let mut version = None;

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            match key.trim() {
                "Name" => name = Some(value.trim()),
                "Version" => version = Some(value.trim()),
                _ => {},
            }
        }
    }

    match (name, version) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Some((name, version))
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path.to_path_buf()).unwrap()
    }

    async fn write_dist_info(dir: &Utf8Path, name: &str, version: &str) {
        let info = dir.join(format!("{}-{}.dist-info", name, version));
        tokio::fs::create_dir_all(&info).await.unwrap();
        tokio::fs::write(
            info.join("METADATA"),
            format!(
                "Metadata-Version: 2.1\nName: {}\nVersion: {}\nSummary: test\n\nName: body\n",
                name, version
            ),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_inspect_dist_and_egg_info() {
        let temp_dir = TempDir::new().unwrap();
        let site = utf8(temp_dir.path());
        write_dist_info(&site, "Flask", "2.0.1").await;
        write_dist_info(&site, "requests", "2.25.1").await;
        tokio::fs::write(
            site.join("six-1.16.0-py3.9.egg-info"),
            "Metadata-Version: 1.0\nName: six\nVersion: 1.16.0\n",
        )
        .await
        .unwrap();
        tokio::fs::create_dir_all(site.join("flask")).await.unwrap();

        let index = inspect_site_packages(&[site]).await.unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.get("flask"), Some("2.0.1"));
        assert_eq!(index.get("requests"), Some("2.25.1"));
        assert_eq!(index.get("six"), Some("1.16.0"));
    }

    #[tokio::test]
    async fn test_incomplete_metadata_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let site = utf8(temp_dir.path());
        let info = site.join("broken-0.1.dist-info");
        tokio::fs::create_dir_all(&info).await.unwrap();
        tokio::fs::write(info.join("METADATA"), "Name: broken\n").await.unwrap();

        let index = inspect_site_packages(&[site]).await.unwrap();
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = utf8(temp_dir.path()).join("nope");

        assert!(matches!(
            inspect_site_packages(&[missing]).await,
            Err(AstrixError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_discover_site_packages() {
        let temp_dir = TempDir::new().unwrap();
        let venv = utf8(temp_dir.path());
        let posix = venv.join("lib").join("python3.11").join("site-packages");
        tokio::fs::create_dir_all(&posix).await.unwrap();

        assert_eq!(discover_site_packages(&venv), vec![posix]);
    }

    #[test]
    fn test_from_settings_uses_configured_dirs() {
        let settings = EnvironmentSettings {
            site_packages: vec!["/opt/site-packages".to_string()],
            record_file: "venv_record.txt".to_string(),
        };
        let inspector = EnvironmentInspector::from_settings(&settings).unwrap();
        assert_eq!(
            inspector.site_packages(),
            &[Utf8PathBuf::from("/opt/site-packages")]
        );
    }

    #[test]
    fn test_parse_metadata_headers_only() {
        let content = "Name: demo\nVersion: 1.0\n\nVersion: 9.9\n";
        assert_eq!(parse_metadata(content), Some(("demo", "1.0")));
        assert_eq!(parse_metadata("Version: 1.0\n"), None);
    }
}
