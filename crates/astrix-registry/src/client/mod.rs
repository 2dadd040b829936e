//! HTTP client implementation with retry logic

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::{debug, warn};
use url::Url;

use astrix_core::error::AstrixError;
use astrix_core::types::Requirement;

use crate::api::{ProjectDetails, ProjectResponse};
use crate::RegistryResult;

/// Default PyPI JSON API root
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Authentication configuration for private indexes
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Basic auth username
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// Everything needed to build a client
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Index root; package metadata lives at `{base_url}/{name}/json`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub auth: Option<AuthConfig>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INDEX_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            auth: None,
        }
    }
}

/// HTTP client for package index metadata
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base index URL
    base_url: String,
}

impl RegistryClient {
    /// Create a client for the public index
    pub fn new() -> RegistryResult<Self> {
        Self::with_options(RegistryOptions::default())
    }

    /// Create a client for the public index with authentication
    pub fn with_auth(auth: AuthConfig) -> RegistryResult<Self> {
        Self::with_options(RegistryOptions {
            auth: Some(auth),
            ..RegistryOptions::default()
        })
    }

    /// Create a client with custom configuration
    pub fn with_options(options: RegistryOptions) -> RegistryResult<Self> {
        let mut builder = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(options.timeout)
            .gzip(true)
            .user_agent(concat!("astrix/", env!("CARGO_PKG_VERSION")));

        if let Some(auth_config) = options.auth {
            if let Some(header) = authorization_header(auth_config)? {
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(reqwest::header::AUTHORIZATION, header);
                builder = builder.default_headers(headers);
            }
        }

        let client = builder.build().map_err(|e| {
            AstrixError::registry(
                &options.base_url,
                format!("Failed to create HTTP client: {}", e),
                e,
            )
        })?;

        Ok(Self {
            client,
            retry_config: options.retry,
            base_url: options.base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.retry_config.max_retries || !error.is_recoverable() {
                        return Err(error);
                    }
                    attempt += 1;
                    debug!("Registry request failed ({}), retry {} in {:?}", error, attempt, delay);

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                },
            }
        }
    }

    /// Build `{base}/{package}[/{version}]/json` with each segment escaped
    fn metadata_url(&self, package: &str, version: Option<&str>) -> RegistryResult<Url> {
        let invalid = |message: String| AstrixError::RegistryUnavailable {
            package: package.to_string(),
            message,
            source: None,
        };

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("Invalid index URL '{}': {}", self.base_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid(format!("Index URL '{}' cannot be a base", self.base_url)))?;
            segments.pop_if_empty().push(package);
            if let Some(version) = version {
                segments.push(version);
            }
            segments.push("json");
        }
        Ok(url)
    }

    /// Fetch project metadata, optionally pinned to a version
    pub async fn fetch_metadata(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> RegistryResult<ProjectResponse> {
        let url = self.metadata_url(package, version)?;
        debug!("Fetching metadata from {}", url);

        self.with_retry(|| async {
            let response = self
                .client
                .get(url.clone())
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| {
                    AstrixError::registry(package, format!("Failed to fetch metadata: {}", e), e)
                })?;

            match response.status() {
                reqwest::StatusCode::OK => response.json::<ProjectResponse>().await.map_err(|e| {
                    AstrixError::registry(package, format!("Failed to parse metadata: {}", e), e)
                }),
                reqwest::StatusCode::NOT_FOUND => Err(AstrixError::PackageNotFound {
                    name: package.to_string(),
                }),
                status => Err(AstrixError::RegistryUnavailable {
                    package: package.to_string(),
                    message: format!("Registry returned status {}", status),
                    source: None,
                }),
            }
        })
        .await
    }

    /// Fetch the requirements a project declares.
    ///
    /// A null or absent `requires_dist` yields an empty list; requirement
    /// strings that cannot be parsed are logged and skipped.
    pub async fn fetch_requirements(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> RegistryResult<Vec<Requirement>> {
        let metadata = self.fetch_metadata(package, version).await?;
        let Some(requires_dist) = metadata.info.requires_dist else {
            debug!("No requirements declared by {}", package);
            return Ok(Vec::new());
        };

        let requirements = requires_dist
            .iter()
            .filter_map(|raw| match Requirement::parse(raw) {
                Ok(requirement) => Some(requirement),
                Err(e) => {
                    warn!("Skipping requirement of {}: {}", package, e);
                    None
                },
            })
            .collect();
        Ok(requirements)
    }

    /// Fetch the summary and links of a project
    pub async fn fetch_project(&self, package: &str) -> RegistryResult<ProjectDetails> {
        let metadata = self.fetch_metadata(package, None).await?;
        Ok(ProjectDetails::from_info(package, &metadata.info))
    }
}

fn authorization_header(
    auth: AuthConfig,
) -> RegistryResult<Option<reqwest::header::HeaderValue>> {
    let value = match auth {
        AuthConfig {
            token: Some(token), ..
        } => format!("Bearer {}", token),
        AuthConfig {
            username: Some(username),
            password: Some(password),
            ..
        } => {
            use base64::{engine::general_purpose, Engine as _};
            format!(
                "Basic {}",
                general_purpose::STANDARD.encode(format!("{}:{}", username, password))
            )
        },
        _ => return Ok(None),
    };

    let mut header: reqwest::header::HeaderValue =
        value.parse().map_err(|e| AstrixError::ConfigValidation {
            field: "registry.token".to_string(),
            reason: format!("Invalid authorization header: {}", e),
        })?;
    header.set_sensitive(true);
    Ok(Some(header))
}

#[cfg(test)]
mod tests;
