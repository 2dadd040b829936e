//! Package index JSON API response types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Response of `GET {index}/{package}[/{version}]/json`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectResponse {
    pub info: ProjectInfo,
}

/// The `info` object of a project response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectInfo {
    /// Canonical distribution name
    pub name: Option<String>,
    /// Version the metadata describes
    pub version: Option<String>,
    /// One-line description
    pub summary: Option<String>,
    /// Named project links, in index order
    pub project_urls: Option<IndexMap<String, String>>,
    /// PEP 508 requirement strings; null when the project declares none
    pub requires_dist: Option<Vec<String>>,
}

/// Human-facing summary of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    pub name: String,
    pub summary: Option<String>,
    pub documentation: Option<String>,
    /// First project link pointing at GitHub
    pub repository: Option<String>,
}

impl ProjectDetails {
    /// Extract details from an `info` object
    pub fn from_info(package: &str, info: &ProjectInfo) -> Self {
        let urls = info.project_urls.as_ref();
        let documentation = urls.and_then(|urls| urls.get("Documentation")).cloned();
        let repository = urls.and_then(|urls| {
            urls.values()
                .find(|url| url.to_lowercase().contains("github"))
                .cloned()
        });

        Self {
            name: info.name.clone().unwrap_or_else(|| package.to_string()),
            summary: info.summary.clone().filter(|s| !s.trim().is_empty()),
            documentation,
            repository,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_fields_deserialize() {
        let response: ProjectResponse = serde_json::from_value(serde_json::json!({
            "info": {
                "name": "flask",
                "summary": null,
                "project_urls": null,
                "requires_dist": null
            }
        }))
        .unwrap();

        assert!(response.info.requires_dist.is_none());
        assert!(response.info.project_urls.is_none());
        assert!(response.info.version.is_none());
    }

    #[test]
    fn test_project_details() {
        let info: ProjectInfo = serde_json::from_value(serde_json::json!({
            "name": "requests",
            "summary": "Python HTTP for Humans.",
            "project_urls": {
                "Documentation": "https://requests.readthedocs.io",
                "Source": "https://github.com/psf/requests",
                "Mirror": "https://github.com/mirror/requests"
            }
        }))
        .unwrap();

        let details = ProjectDetails::from_info("requests", &info);
        assert_eq!(details.name, "requests");
        assert_eq!(details.summary.as_deref(), Some("Python HTTP for Humans."));
        assert_eq!(
            details.documentation.as_deref(),
            Some("https://requests.readthedocs.io")
        );
        assert_eq!(
            details.repository.as_deref(),
            Some("https://github.com/psf/requests")
        );
    }

    #[test]
    fn test_project_details_without_links() {
        let details = ProjectDetails::from_info("bare", &ProjectInfo::default());
        assert_eq!(details.name, "bare");
        assert!(details.summary.is_none());
        assert!(details.documentation.is_none());
        assert!(details.repository.is_none());
    }
}
