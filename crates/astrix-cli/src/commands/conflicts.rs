//! `astrix conflicts` command implementation.
//!
//! Parses the manifest, snapshots the installed environment, runs one
//! detection pass and prints the conflicts with the pip commands that would
//! resolve them. Nothing is installed or removed.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use astrix_config::{load_manifest, CliOverrides, EnvironmentInspector};
use astrix_core::error::{AstrixError, AstrixResult};
use astrix_core::types::{ConflictMap, Diagnostic, ResolutionCommand};
use astrix_resolver::{plan, ConflictDetector, DetectionReport};

use super::{registry_client, CommandContext};
use crate::output::render_command;

/// Arguments of `astrix conflicts`
#[derive(Debug, Clone)]
pub struct ConflictsArgs {
    pub manifest: Utf8PathBuf,
    pub site_packages: Vec<Utf8PathBuf>,
    pub depth: Option<usize>,
    pub registry: Option<String>,
    pub json: bool,
}

/// Machine readable report
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    conflicts: &'a ConflictMap,
    diagnostics: &'a [Diagnostic],
    commands: &'a [ResolutionCommand],
}

/// Execute the `astrix conflicts` command
pub async fn execute(args: ConflictsArgs, ctx: &CommandContext) -> AstrixResult<()> {
    let overrides = CliOverrides {
        registry_url: args.registry.clone(),
        depth: args.depth,
        site_packages: args.site_packages.iter().map(|p| p.to_string()).collect(),
    };
    let config = ctx.load_config(&overrides).await?;

    let manifest = absolute(&ctx.cwd, &args.manifest);
    let declared = load_manifest(&manifest).await?;
    let installed = EnvironmentInspector::from_settings(&config.environment)?
        .inspect()
        .await?;

    let client = registry_client(&config)?;
    let report = ConflictDetector::new(&client)
        .with_depth(config.resolver.depth)
        .detect(&declared, &installed)
        .await;
    let commands = plan(&report.conflicts);

    if args.json {
        ctx.output.line(&json_report(&report, &commands)?);
    } else {
        print_report(&report, &commands, declared.len(), ctx);
    }
    Ok(())
}

/// Render the report as pretty-printed JSON
pub(crate) fn json_report(
    report: &DetectionReport,
    commands: &[ResolutionCommand],
) -> AstrixResult<String> {
    serde_json::to_string_pretty(&JsonReport {
        conflicts: &report.conflicts,
        diagnostics: &report.diagnostics,
        commands,
    })
    .map_err(|e| AstrixError::serialization("conflict report", e))
}

fn print_report(
    report: &DetectionReport,
    commands: &[ResolutionCommand],
    declared: usize,
    ctx: &CommandContext,
) {
    for diagnostic in &report.diagnostics {
        ctx.output.warn(&ctx.output.diagnostic_line(diagnostic));
    }

    if report.is_clean() {
        ctx.output
            .success(&format!("No conflicts among {} declared dependencies", declared));
        return;
    }

    ctx.output
        .warn(&format!("Found {} conflicts", report.conflicts.len()));
    for conflict in report.conflicts.values() {
        ctx.output.line(&ctx.output.conflict_line(conflict));
    }

    ctx.output.info("");
    ctx.output.info("To resolve, run:");
    for command in commands {
        for text in render_command(command) {
            ctx.output.line(&format!("  {}", text));
        }
    }
}

fn absolute(cwd: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
