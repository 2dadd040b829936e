//! # astrix-cli
//!
//! Dependency conflict detection for Python projects.
//!
//! This is the main entry point for the Astrix CLI tool. It handles command
//! parsing, sets up logging and error reporting, and dispatches to the
//! appropriate command handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use astrix_core::error::{AstrixError, AstrixResult};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Detect and plan fixes for Python dependency conflicts
#[derive(Parser)]
#[command(name = "astrix", version, about = "Python dependency conflict checker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a manifest with the installed environment
    Conflicts {
        /// requirements .txt file, pyproject.toml or setup.py
        manifest: PathBuf,
        /// Site-packages directory to inspect (repeatable)
        #[arg(long = "site-packages", value_name = "DIR")]
        site_packages: Vec<PathBuf>,
        /// Levels of requirements a missing dependency expands into
        #[arg(long)]
        depth: Option<usize>,
        /// Registry JSON API root
        #[arg(long, value_name = "URL")]
        registry: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a package's summary and links
    Info { package: String },
    /// Show details of the modules a Python script imports
    Deps {
        /// Python source file to scan
        script: PathBuf,
    },
    /// Show the effective configuration and where it came from
    Config,
    /// Manage recorded environments
    Envs {
        #[command(subcommand)]
        action: EnvsAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum EnvsAction {
    /// List recorded environments
    List,
    /// Record an environment name
    Record { name: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting Astrix CLI v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> AstrixResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| AstrixError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new()?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

/// Log to stderr so report output on stdout stays machine readable
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "astrix={level},astrix_core={level},astrix_config={level},\
             astrix_registry={level},astrix_resolver={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Astrix encountered an unexpected error: {}", panic_info);
        eprintln!("Astrix crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/astrix-dev/astrix/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
