//! `astrix deps` command implementation.
//!
//! Lists the modules a script imports. Standard library modules link to the
//! Python documentation; every other module is looked up in the registry
//! under its import name.

use camino::Utf8Path;
use tracing::warn;

use astrix_config::{is_stdlib, load_imports, CliOverrides};
use astrix_core::error::AstrixResult;
use astrix_registry::{ProjectDetails, RegistryClient};

use super::{info::print_details, registry_client, CommandContext};

const STDLIB_SUMMARY: &str = "Python standard library module";
const CPYTHON_REPOSITORY: &str = "https://github.com/python/cpython";

/// Execute the `astrix deps` command
pub async fn execute(script: &Utf8Path, ctx: &CommandContext) -> AstrixResult<()> {
    let script = if script.is_absolute() {
        script.to_path_buf()
    } else {
        ctx.cwd.join(script)
    };
    let modules = load_imports(&script).await?;

    if modules.is_empty() {
        ctx.output.info(&format!("{} imports no modules", script));
        return Ok(());
    }

    let config = ctx.load_config(&CliOverrides::default()).await?;
    let client = registry_client(&config)?;

    for details in module_details(&modules, &client).await {
        print_details(&details, ctx);
    }
    Ok(())
}

/// Details for each module in order; registry failures leave the fields empty
pub(crate) async fn module_details(
    modules: &[String],
    client: &RegistryClient,
) -> Vec<ProjectDetails> {
    let mut details = Vec::with_capacity(modules.len());

    for module in modules {
        if is_stdlib(module) {
            details.push(stdlib_details(module));
            continue;
        }

        match client.fetch_project(module).await {
            Ok(project) => details.push(ProjectDetails {
                name: module.clone(),
                ..project
            }),
            Err(e) => {
                warn!("Could not look up {}: {}", module, e);
                details.push(ProjectDetails {
                    name: module.clone(),
                    summary: None,
                    documentation: None,
                    repository: None,
                });
            },
        }
    }

    details
}

fn stdlib_details(module: &str) -> ProjectDetails {
    ProjectDetails {
        name: module.to_string(),
        summary: Some(STDLIB_SUMMARY.to_string()),
        documentation: Some(format!("https://docs.python.org/3/library/{}.html", module)),
        repository: Some(CPYTHON_REPOSITORY.to_string()),
    }
}
