//! podlint CLI tool.
//!
//! Usage:
//! ```bash
//! podlint check [OPTIONS] [PATH]
//! podlint check-config [PATH]
//! podlint list-rules
//! podlint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Rust linter driven by an XML configuration document
#[derive(Parser)]
#[command(name = "podlint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PODLINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated names or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Worker threads (default: `<Analyzer parallelism>`, then all cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Load the configuration and report its problems only
    CheckConfig {
        /// Project directory used to find the configuration
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
            jobs,
        } => {
            let config = config_resolver::resolve(&path, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                format,
                rules,
                exclude,
                jobs,
            };
            commands::check::run(&path, options, config)
        }
        Commands::CheckConfig { path } => {
            commands::check_config::run(config_resolver::resolve(&path, cli.config.as_deref()))
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
