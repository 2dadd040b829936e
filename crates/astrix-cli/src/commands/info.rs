//! `astrix info` command implementation.

use astrix_config::CliOverrides;
use astrix_core::error::AstrixResult;
use astrix_registry::ProjectDetails;

use super::{registry_client, CommandContext};

/// Execute the `astrix info` command
pub async fn execute(package: &str, ctx: &CommandContext) -> AstrixResult<()> {
    let config = ctx.load_config(&CliOverrides::default()).await?;
    let details = registry_client(&config)?.fetch_project(package).await?;

    print_details(&details, ctx);
    Ok(())
}

/// Print a project's summary and links as an indented block
pub(crate) fn print_details(details: &ProjectDetails, ctx: &CommandContext) {
    ctx.output.line(&details.name);
    ctx.output.line(&format!(
        "  Summary:       {}",
        details.summary.as_deref().unwrap_or("No summary available")
    ));
    ctx.output.line(&format!(
        "  Documentation: {}",
        details.documentation.as_deref().unwrap_or("-")
    ));
    ctx.output.line(&format!(
        "  Repository:    {}",
        details.repository.as_deref().unwrap_or("-")
    ));
}
