//! astrix.toml settings parsing and validation

use serde::{Deserialize, Serialize};

use astrix_core::error::AstrixError;

use crate::ConfigResult;

/// Default metadata endpoint
pub const DEFAULT_REGISTRY_URL: &str = "https://pypi.org/pypi";

/// Default file holding recorded environment names
pub const DEFAULT_RECORD_FILE: &str = "venv_record.txt";

/// Effective configuration after layering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstrixConfig {
    pub registry: RegistrySettings,
    pub resolver: ResolverSettings,
    pub environment: EnvironmentSettings,
}

/// Metadata service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Base URL of the JSON metadata endpoint
    pub url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient failures
    pub max_retries: u32,

    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Detection pass settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Levels of requirements a missing dependency expands into
    pub depth: usize,
}

/// Installed environment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    /// Site-packages directories to inspect
    pub site_packages: Vec<String>,

    /// File listing recorded environment names
    pub record_file: String,
}

/// One config file as written; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub registry: RegistryFile,
    #[serde(default)]
    pub resolver: ResolverFile,
    #[serde(default)]
    pub environment: EnvironmentFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverFile {
    pub depth: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentFile {
    pub site_packages: Option<Vec<String>>,
    pub record_file: Option<String>,
}

impl Default for AstrixConfig {
    fn default() -> Self {
        Self {
            registry: RegistrySettings {
                url: DEFAULT_REGISTRY_URL.to_string(),
                timeout_secs: 30,
                max_retries: 3,
                token: None,
            },
            resolver: ResolverSettings { depth: 1 },
            environment: EnvironmentSettings {
                site_packages: Vec::new(),
                record_file: DEFAULT_RECORD_FILE.to_string(),
            },
        }
    }
}

impl AstrixConfig {
    /// Overlay the keys present in `file`
    pub fn apply(&mut self, file: ConfigFile) {
        let ConfigFile {
            registry,
            resolver,
            environment,
        } = file;

        if let Some(url) = registry.url {
            self.registry.url = url;
        }
        if let Some(timeout) = registry.timeout_secs {
            self.registry.timeout_secs = timeout;
        }
        if let Some(retries) = registry.max_retries {
            self.registry.max_retries = retries;
        }
        if registry.token.is_some() {
            self.registry.token = registry.token;
        }
        if let Some(depth) = resolver.depth {
            self.resolver.depth = depth;
        }
        if let Some(site_packages) = environment.site_packages {
            self.environment.site_packages = site_packages;
        }
        if let Some(record_file) = environment.record_file {
            self.environment.record_file = record_file;
        }
    }
}

/// Parse an astrix.toml document
pub fn parse_config(content: &str) -> ConfigResult<ConfigFile> {
    toml::from_str(content).map_err(|e| AstrixError::TomlParse {
        message: e.to_string(),
    })
}

/// Serialize an effective configuration back to TOML
pub fn serialize_config(config: &AstrixConfig) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| AstrixError::serialization("configuration", e))
}

/// Load and parse a config file
pub async fn load_from_file(path: &camino::Utf8Path) -> ConfigResult<ConfigFile> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AstrixError::io(format!("Failed to read {}", path), e))?;

    parse_config(&content).map_err(|e| match e {
        AstrixError::TomlParse { message } => AstrixError::TomlParse {
            message: format!("in {}: {}", path, message),
        },
        other => other,
    })
}

/// Reject settings no run could use
pub fn validate_config(config: &AstrixConfig) -> ConfigResult<()> {
    let url = url::Url::parse(&config.registry.url).map_err(|e| AstrixError::ConfigValidation {
        field: "registry.url".to_string(),
        reason: format!("'{}' is not a valid URL: {}", config.registry.url, e),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AstrixError::ConfigValidation {
            field: "registry.url".to_string(),
            reason: format!("unsupported scheme '{}', expected http or https", url.scheme()),
        });
    }

    if config.registry.timeout_secs == 0 {
        return Err(AstrixError::ConfigValidation {
            field: "registry.timeout_secs".to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }

    if config.environment.record_file.trim().is_empty() {
        return Err(AstrixError::ConfigValidation {
            field: "environment.record_file".to_string(),
            reason: "record file path is empty".to_string(),
        });
    }

    Ok(())
}
