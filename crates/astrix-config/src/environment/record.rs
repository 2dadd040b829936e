//! Recorded environment names

use std::future::Future;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use astrix_core::error::AstrixError;

use crate::ConfigResult;

/// Store of environment names created for projects
pub trait EnvironmentRecord {
    /// Remember `name`; returns false when it was already recorded
    fn record(&self, name: &str) -> impl Future<Output = ConfigResult<bool>> + Send;

    /// Recorded names in recording order
    fn list(&self) -> impl Future<Output = ConfigResult<Vec<String>>> + Send;
}

/// One name per line in a plain text file
#[derive(Debug, Clone)]
pub struct FileEnvironmentRecord {
    path: Utf8PathBuf,
}

impl FileEnvironmentRecord {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    async fn read_names(&self) -> ConfigResult<Vec<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AstrixError::io(format!("Failed to read {}", self.path), e)),
        }
    }
}

impl EnvironmentRecord for FileEnvironmentRecord {
    fn record(&self, name: &str) -> impl Future<Output = ConfigResult<bool>> + Send {
        let name = name.trim().to_string();
        async move {
            if name.is_empty() || name.contains(['\n', '\r']) {
                return Err(AstrixError::ConfigValidation {
                    field: "name".to_string(),
                    reason: "environment names must be a single non-empty line".to_string(),
                });
            }

            let mut names = self.read_names().await?;
            if names.contains(&name) {
                debug!("Environment {} already recorded", name);
                return Ok(false);
            }

            names.push(name);
            let mut content = names.join("\n");
            content.push('\n');
            tokio::fs::write(&self.path, content)
                .await
                .map_err(|e| AstrixError::io(format!("Failed to write {}", self.path), e))?;
            Ok(true)
        }
    }

    fn list(&self) -> impl Future<Output = ConfigResult<Vec<String>>> + Send {
        self.read_names()
    }
}
