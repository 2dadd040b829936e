//! Configuration layering, fallback logic, and environment overrides

use std::collections::HashMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use astrix_core::error::AstrixError;

use crate::settings::{self, AstrixConfig, ConfigFile};
use crate::ConfigResult;

/// Project config file name
pub const PROJECT_CONFIG: &str = "astrix.toml";

/// Prefix of recognised environment overrides
const ENV_PREFIX: &str = "ASTRIX_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Global config location, if one could be determined
    global_path: Option<Utf8PathBuf>,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Values given on the command line, highest priority
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub registry_url: Option<String>,
    pub depth: Option<usize>,
    pub site_packages: Vec<String>,
}

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults
    Defaults,
    /// Global config file
    Global(Utf8PathBuf),
    /// Project astrix.toml file
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

impl ConfigLoader {
    /// Create a loader rooted at `cwd` using the platform config directory
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let global_path = dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::try_from(dir).ok())
            .map(|dir| dir.join("astrix").join("config.toml"));

        Self { cwd, global_path }
    }

    /// Override the global config location
    pub fn with_global_path(mut self, path: Option<Utf8PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    pub fn global_path(&self) -> Option<&Utf8Path> {
        self.global_path.as_deref()
    }

    /// Find a file in the project by walking up from the working directory
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    /// Load the global config file, if present
    pub async fn load_global_config(&self) -> ConfigResult<Option<(ConfigFile, Utf8PathBuf)>> {
        match self.global_path {
            Some(ref path) if path.is_file() => {
                let file = settings::load_from_file(path).await?;
                Ok(Some((file, path.clone())))
            },
            _ => Ok(None),
        }
    }

    /// Load the nearest project astrix.toml, if present
    pub async fn load_project_config(&self) -> ConfigResult<Option<(ConfigFile, Utf8PathBuf)>> {
        match self.resolve_config_path(PROJECT_CONFIG) {
            Some(path) => {
                let file = settings::load_from_file(&path).await?;
                Ok(Some((file, path)))
            },
            None => Ok(None),
        }
    }

    /// Load every layer and return the validated result with its sources
    pub async fn load(
        &self,
        cli: &CliOverrides,
    ) -> ConfigResult<(AstrixConfig, Vec<ConfigSource>)> {
        let global = self.load_global_config().await?;
        let project = self.load_project_config().await?;
        let env = ConfigLayering::collect_env_overrides();

        ConfigLayering::merge_configs(global, project, &env, cli)
    }
}

impl ConfigLayering {
    /// Merge layers in increasing priority: defaults, global, project,
    /// environment, command line
    pub fn merge_configs(
        global: Option<(ConfigFile, Utf8PathBuf)>,
        project: Option<(ConfigFile, Utf8PathBuf)>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &CliOverrides,
    ) -> ConfigResult<(AstrixConfig, Vec<ConfigSource>)> {
        let mut merged = AstrixConfig::default();
        let mut sources = vec![ConfigSource::Defaults];

        if let Some((file, path)) = global {
            merged.apply(file);
            sources.push(ConfigSource::Global(path));
        }

        if let Some((file, path)) = project {
            merged.apply(file);
            sources.push(ConfigSource::Project(path));
        }

        sources.extend(Self::apply_env_overrides(&mut merged, env_overrides)?);

        if Self::apply_cli_overrides(&mut merged, cli_overrides) {
            sources.push(ConfigSource::CommandLine);
        }

        settings::validate_config(&merged)?;
        debug!("Configuration layers: {:?}", sources);

        Ok((merged, sources))
    }

    /// Apply environment variable overrides, returning one source per key used
    fn apply_env_overrides(
        config: &mut AstrixConfig,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<Vec<ConfigSource>> {
        let mut keys: Vec<&String> = overrides.keys().collect();
        keys.sort();

        let mut applied = Vec::new();
        for key in keys {
            let value = &overrides[key];
            match key.as_str() {
                "ASTRIX_REGISTRY_URL" => config.registry.url = value.clone(),
                "ASTRIX_REGISTRY_TOKEN" => config.registry.token = Some(value.clone()),
                "ASTRIX_TIMEOUT_SECS" => config.registry.timeout_secs = parse_number(key, value)?,
                "ASTRIX_MAX_RETRIES" => config.registry.max_retries = parse_number(key, value)?,
                "ASTRIX_DEPTH" => config.resolver.depth = parse_number(key, value)?,
                _ => continue,
            }
            applied.push(ConfigSource::Environment(key.clone()));
        }

        Ok(applied)
    }

    /// Apply CLI flag overrides; true when any flag was given
    fn apply_cli_overrides(config: &mut AstrixConfig, overrides: &CliOverrides) -> bool {
        let mut applied = false;

        if let Some(ref url) = overrides.registry_url {
            config.registry.url = url.clone();
            applied = true;
        }
        if let Some(depth) = overrides.depth {
            config.resolver.depth = depth;
            applied = true;
        }
        if !overrides.site_packages.is_empty() {
            config.environment.site_packages = overrides.site_packages.clone();
            applied = true;
        }

        applied
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Defaults => write!(f, "built-in defaults"),
            ConfigSource::Global(path) => write!(f, "global config {}", path),
            ConfigSource::Project(path) => write!(f, "project config {}", path),
            ConfigSource::Environment(key) => write!(f, "environment variable {}", key),
            ConfigSource::CommandLine => write!(f, "command line flags"),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AstrixError::ConfigValidation {
            field: key.to_string(),
            reason: format!("'{}' is not a non-negative integer", value),
        })
}
