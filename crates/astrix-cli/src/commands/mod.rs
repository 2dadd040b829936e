//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking its arguments and the shared
//! [`CommandContext`].

use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use tracing::{debug, info};

use astrix_config::{AstrixConfig, CliOverrides, ConfigLoader, ConfigSource};
use astrix_core::error::{AstrixError, AstrixResult};
use astrix_registry::{AuthConfig, RegistryClient, RegistryOptions, RetryConfig};

pub mod config;
pub mod conflicts;
pub mod deps;
pub mod envs;
pub mod info;


use crate::{output::OutputHandler, Commands, EnvsAction};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    /// Global config location; `None` skips the global layer
    pub global_config: Option<Utf8PathBuf>,
}

impl CommandContext {
    /// Create a context for the current directory
    pub fn new() -> AstrixResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| AstrixError::io("Failed to get current directory".to_string(), e))?;
        let cwd = utf8_path(cwd)?;
        let loader = ConfigLoader::new(cwd.clone());

        Ok(Self {
            global_config: loader.global_path().map(Utf8PathBuf::from),
            cwd,
            output: OutputHandler::new(),
        })
    }

    /// Load layered configuration along with the layers that contributed
    pub async fn load_layers(
        &self,
        overrides: &CliOverrides,
    ) -> AstrixResult<(AstrixConfig, Vec<ConfigSource>)> {
        ConfigLoader::new(self.cwd.clone())
            .with_global_path(self.global_config.clone())
            .load(overrides)
            .await
    }

    /// Load layered configuration with command line overrides applied
    pub async fn load_config(&self, overrides: &CliOverrides) -> AstrixResult<AstrixConfig> {
        let (config, sources) = self.load_layers(overrides).await?;
        debug!("Loaded configuration from {:?}", sources);
        Ok(config)
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> AstrixResult<()> {
    match command {
        Commands::Conflicts {
            manifest,
            site_packages,
            depth,
            registry,
            json,
        } => {
            info!("Checking conflicts for {}", manifest.display());
            let args = conflicts::ConflictsArgs {
                manifest: utf8_path(manifest)?,
                site_packages: site_packages
                    .into_iter()
                    .map(utf8_path)
                    .collect::<AstrixResult<_>>()?,
                depth,
                registry,
                json,
            };
            conflicts::execute(args, ctx).await
        },
        Commands::Info { package } => {
            info!("Showing details of {}", package);
            info::execute(&package, ctx).await
        },
        Commands::Deps { script } => {
            info!("Listing imports of {}", script.display());
            deps::execute(&utf8_path(script)?, ctx).await
        },
        Commands::Config => config::execute(ctx).await,
        Commands::Envs { action } => match action {
            EnvsAction::List => envs::list(ctx).await,
            EnvsAction::Record { name } => envs::record(&name, ctx).await,
        },
        Commands::Version => show_version(ctx),
    }
}

/// Client options derived from the `[registry]` settings
pub fn registry_options(config: &AstrixConfig) -> RegistryOptions {
    let settings = &config.registry;
    RegistryOptions {
        base_url: settings.url.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
        retry: RetryConfig {
            max_retries: settings.max_retries,
            ..RetryConfig::default()
        },
        auth: settings.token.as_ref().map(|token| AuthConfig {
            token: Some(token.clone()),
            ..AuthConfig::default()
        }),
    }
}

/// Build the registry client for a loaded configuration
pub fn registry_client(config: &AstrixConfig) -> AstrixResult<RegistryClient> {
    RegistryClient::with_options(registry_options(config))
}

fn show_version(ctx: &CommandContext) -> AstrixResult<()> {
    let target = format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS);

    ctx.output.line(&format!("astrix v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.info(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.info(&format!("Target: {}", target));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));
    Ok(())
}

fn utf8_path(path: PathBuf) -> AstrixResult<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| AstrixError::ConfigValidation {
        field: "path".to_string(),
        reason: format!("{} is not valid UTF-8", path.display()),
    })
}
