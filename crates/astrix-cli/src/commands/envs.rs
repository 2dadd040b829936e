//! `astrix envs` command implementations.

use astrix_config::{CliOverrides, EnvironmentRecord, FileEnvironmentRecord};
use astrix_core::error::AstrixResult;

use super::CommandContext;

async fn open_record(ctx: &CommandContext) -> AstrixResult<FileEnvironmentRecord> {
    let config = ctx.load_config(&CliOverrides::default()).await?;
    Ok(FileEnvironmentRecord::new(
        ctx.cwd.join(&config.environment.record_file),
    ))
}

/// Execute `astrix envs list`
pub async fn list(ctx: &CommandContext) -> AstrixResult<()> {
    let names = open_record(ctx).await?.list().await?;

    if names.is_empty() {
        ctx.output.info("No environments have been recorded");
        return Ok(());
    }

    ctx.output.info("Recorded environments:");
    for name in names {
        ctx.output.line(&format!("- {}", name));
    }
    Ok(())
}

/// Execute `astrix envs record <NAME>`
pub async fn record(name: &str, ctx: &CommandContext) -> AstrixResult<()> {
    let record = open_record(ctx).await?;

    if record.record(name).await? {
        ctx.output
            .success(&format!("Recorded environment '{}' in {}", name.trim(), record.path()));
    } else {
        ctx.output
            .warn(&format!("Environment '{}' is already recorded", name.trim()));
    }
    Ok(())
}
