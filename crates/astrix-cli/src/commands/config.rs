//! `astrix config` command implementation.

use astrix_config::{settings, AstrixConfig, CliOverrides};
use astrix_core::error::AstrixResult;

use super::CommandContext;

const REDACTED: &str = "********";

/// Execute the `astrix config` command
pub async fn execute(ctx: &CommandContext) -> AstrixResult<()> {
    let (config, sources) = ctx.load_layers(&CliOverrides::default()).await?;

    ctx.output.info("Configuration sources, lowest priority first:");
    for source in &sources {
        ctx.output.info(&format!("- {}", source));
    }
    ctx.output.line(&render(&config)?);
    Ok(())
}

/// Effective configuration as TOML with the registry token hidden
pub(crate) fn render(config: &AstrixConfig) -> AstrixResult<String> {
    let mut shown = config.clone();
    if shown.registry.token.is_some() {
        shown.registry.token = Some(REDACTED.to_string());
    }
    settings::serialize_config(&shown)
}
