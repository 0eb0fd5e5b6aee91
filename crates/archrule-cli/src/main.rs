//! archrule CLI tool.
//!
//! Usage:
//! ```bash
//! archrule check --graph graph.json [--format text|json|compact]
//! archrule list-rules
//! archrule init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Evaluates architecture rules against an imported dependency graph
#[derive(Parser)]
#[command(name = "archrule")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file (takes precedence over $ARCHRULE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the configured rules
    Check {
        /// Graph snapshot (JSON) produced by an importer
        #[arg(short, long)]
        graph: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names)
        #[arg(long)]
        rules: Option<String>,
    },

    /// List the rules declared in the configuration
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for evaluation results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable reports.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per violation.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = config_resolver::Lookup::from_env(cli.config).resolve(Path::new("."));

    match cli.command {
        Commands::Check {
            graph,
            format,
            rules,
        } => commands::check::run(&graph, format, rules.as_deref(), &source),
        Commands::ListRules => commands::list_rules::run(&source),
        Commands::Init { force } => commands::init::run(force),
    }
}
